//! Selection values and the transform utilities shared by every navigation command.
//!
//! A [`SelectionSet`] is an immutable value: commands never mutate the current selection, they
//! compute a new one and hand it to the host.

use crate::error::BlockError;

/// One selection range, expressed in character offsets.
///
/// `anchor` is the fixed end and `head` the end that moves. A range whose ends are equal is a
/// cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SelectionRange {
    /// The end that stays put while extending.
    pub anchor: usize,
    /// The end that moves.
    pub head: usize,
}

impl SelectionRange {
    /// Create a range from its anchor and head.
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// Create a cursor (an empty range) at `offset`.
    pub fn cursor(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    /// Smaller end of the range.
    pub fn from(&self) -> usize {
        self.anchor.min(self.head)
    }

    /// Larger end of the range.
    pub fn to(&self) -> usize {
        self.anchor.max(self.head)
    }

    /// Returns `true` if the range is a cursor.
    pub fn is_cursor(&self) -> bool {
        self.anchor == self.head
    }

    /// Number of selected characters.
    pub fn len(&self) -> usize {
        self.to() - self.from()
    }

    /// Returns `true` if the range selects nothing.
    pub fn is_empty(&self) -> bool {
        self.is_cursor()
    }

    /// Shift both ends by `delta`, saturating at zero.
    pub fn shifted(&self, delta: isize) -> Self {
        Self::new(
            self.anchor.saturating_add_signed(delta),
            self.head.saturating_add_signed(delta),
        )
    }
}

/// How a new head position is applied to an existing range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Motion {
    /// Collapse the range to a cursor at the new head.
    Move,
    /// Keep the anchor and move only the head.
    Extend,
}

impl Motion {
    /// Build the range that results from moving `range`'s head to `head`.
    pub fn apply(self, range: &SelectionRange, head: usize) -> SelectionRange {
        match self {
            Motion::Move => SelectionRange::cursor(head),
            Motion::Extend => SelectionRange::new(range.anchor, head),
        }
    }
}

/// An ordered, non-empty set of ranges with a designated main range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSet {
    ranges: Vec<SelectionRange>,
    main_index: usize,
}

impl SelectionSet {
    /// A selection holding a single cursor.
    pub fn cursor(offset: usize) -> Self {
        Self::single(SelectionRange::cursor(offset))
    }

    /// A selection holding a single range.
    pub fn single(range: SelectionRange) -> Self {
        Self {
            ranges: vec![range],
            main_index: 0,
        }
    }

    /// Build a selection from explicit ranges.
    ///
    /// Ranges are kept in the given order.
    pub fn from_ranges(ranges: Vec<SelectionRange>, main_index: usize) -> Result<Self, BlockError> {
        if ranges.is_empty() {
            return Err(BlockError::InvalidSelection("selection has no ranges"));
        }
        if main_index >= ranges.len() {
            return Err(BlockError::InvalidSelection("main index out of bounds"));
        }
        Ok(Self { ranges, main_index })
    }

    /// The main range.
    pub fn main(&self) -> &SelectionRange {
        &self.ranges[self.main_index]
    }

    /// Index of the main range.
    pub fn main_index(&self) -> usize {
        self.main_index
    }

    /// All ranges.
    pub fn ranges(&self) -> &[SelectionRange] {
        &self.ranges
    }

    /// Number of ranges.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Always `false`: a selection holds at least one range.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// A selection holding only the main range.
    pub fn as_single(&self) -> Self {
        Self::single(*self.main())
    }

    /// Returns `true` if any range equals `range`.
    pub fn contains(&self, range: &SelectionRange) -> bool {
        self.ranges.iter().any(|r| r == range)
    }

    /// Append ranges after the existing ones, keeping the main index.
    pub fn with_ranges_appended<I>(&self, extra: I) -> Self
    where
        I: IntoIterator<Item = SelectionRange>,
    {
        let mut ranges = self.ranges.clone();
        ranges.extend(extra);
        Self {
            ranges,
            main_index: self.main_index,
        }
    }

    /// Drop repeated ranges, keeping the first occurrence of each in order. The main index moves
    /// to the surviving copy of the main range.
    pub fn deduplicated(&self) -> Self {
        let main = *self.main();
        let mut ranges: Vec<SelectionRange> = Vec::with_capacity(self.ranges.len());
        for range in &self.ranges {
            if !ranges.contains(range) {
                ranges.push(*range);
            }
        }
        let main_index = ranges.iter().position(|r| *r == main).unwrap_or(0);
        Self { ranges, main_index }
    }

    /// Sort ranges by position, merging overlapping ranges and dropping duplicates.
    ///
    /// Touching ranges (`a.to == b.from`) stay separate unless both are the same cursor. The
    /// main range follows whatever range it was merged into.
    pub fn normalized(&self) -> Self {
        let mut tagged: Vec<(SelectionRange, bool)> = self
            .ranges
            .iter()
            .enumerate()
            .map(|(i, r)| (*r, i == self.main_index))
            .collect();

        tagged.sort_by(|(a, _), (b, _)| {
            a.from()
                .cmp(&b.from())
                .then_with(|| a.to().cmp(&b.to()))
                .then_with(|| a.head.cmp(&b.head))
        });

        let mut merged: Vec<(SelectionRange, bool)> = Vec::with_capacity(tagged.len());
        for (range, is_main) in tagged {
            let Some((last, last_main)) = merged.last_mut() else {
                merged.push((range, is_main));
                continue;
            };

            if range.from() < last.to() {
                let from = last.from().min(range.from());
                let to = last.to().max(range.to());
                *last = SelectionRange::new(from, to);
                *last_main |= is_main;
            } else if range.from() == last.from() && range.to() == last.to() {
                *last_main |= is_main;
            } else {
                merged.push((range, is_main));
            }
        }

        let main_index = merged.iter().position(|(_, m)| *m).unwrap_or(0);
        Self {
            ranges: merged.into_iter().map(|(r, _)| r).collect(),
            main_index,
        }
    }
}

impl Default for SelectionSet {
    fn default() -> Self {
        Self::cursor(0)
    }
}

impl From<SelectionRange> for SelectionSet {
    fn from(range: SelectionRange) -> Self {
        Self::single(range)
    }
}

/// Map every range of `selection` through `target`, which computes a new head for each range.
///
/// The result keeps the range count and the main index. `Ok(None)` means the new selection is
/// identical to the old one, so there is nothing to dispatch.
pub fn transform_selection<F>(
    selection: &SelectionSet,
    motion: Motion,
    mut target: F,
) -> Result<Option<SelectionSet>, BlockError>
where
    F: FnMut(&SelectionRange) -> Result<usize, BlockError>,
{
    let mut ranges = Vec::with_capacity(selection.len());
    for range in selection.ranges() {
        let head = target(range)?;
        ranges.push(motion.apply(range, head));
    }

    let next = SelectionSet {
        ranges,
        main_index: selection.main_index(),
    };
    if next == *selection {
        Ok(None)
    } else {
        Ok(Some(next))
    }
}
