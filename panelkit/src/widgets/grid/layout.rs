//! Column layout: flex widths, frozen region and offsets.

use super::column::ColumnKey;
use super::column::ColumnTree;

/// Placement of one visible leaf column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    /// The column.
    pub key: ColumnKey,
    /// Column index.
    pub index: usize,
    /// Left offset within its region (frozen or scrollable).
    pub left: u32,
    /// Rendered width.
    pub width: u32,
    /// Whether the column is pinned.
    pub frozen: bool,
    /// Whether this is the last pinned column.
    pub end: bool,
}

impl ColumnLayout {
    /// Right edge within its region.
    pub fn right(&self) -> u32 {
        self.left + self.width
    }
}

/// Placement of a header cell (group or leaf) at any depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderLayout {
    /// The column.
    pub key: ColumnKey,
    /// Nesting depth, 0 for top-level headers.
    pub depth: usize,
    /// Left offset within its region.
    pub left: u32,
    /// Width spanning its visible leaves.
    pub width: u32,
    /// Whether the header is pinned.
    pub frozen: bool,
    /// Whether this is the last pinned top-level header.
    pub end: bool,
}

/// Computed layout of every visible column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridLayout {
    /// Visible leaves, pinned first.
    pub columns: Vec<ColumnLayout>,
    /// Visible headers in depth-first order.
    pub headers: Vec<HeaderLayout>,
    /// Width of the pinned region.
    pub frozen_width: u32,
    /// Width of the scrollable content.
    pub scroll_width: u32,
    /// Effective number of pinned user headers.
    pub freeze: usize,
}

impl GridLayout {
    /// Computes the layout for a viewport width.
    ///
    /// Pinned leaves keep their basis width and each occupies one extra
    /// pixel of gap, so the pinned region is `sum(basis + 1)`. Scrollable
    /// leaves share the remaining viewport width by flex grow.
    pub fn compute(tree: &ColumnTree, freeze: usize, viewport_width: u32) -> Self {
        let freeze = clamp_freeze(freeze, tree.header_count());
        let pinned_roots = freeze + usize::from(tree.check_column().is_some());
        let pinned: Vec<ColumnKey> = tree.roots().iter().take(pinned_roots).copied().collect();

        let visible: Vec<(usize, ColumnKey)> = tree
            .leaves()
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, key)| !tree.is_hidden(*key))
            .collect();
        let (frozen, scrolling): (Vec<_>, Vec<_>) = visible
            .into_iter()
            .partition(|(_, key)| pinned.contains(&tree.root_of(*key)));

        let mut columns = Vec::with_capacity(frozen.len() + scrolling.len());

        let mut left = 0;
        for (index, key) in &frozen {
            let width = tree.basis(*key);
            columns.push(ColumnLayout {
                key: *key,
                index: *index,
                left,
                width,
                frozen: true,
                end: false,
            });
            left += width + 1;
        }
        let frozen_width = left;
        if let Some(last) = columns.last_mut() {
            last.end = true;
        }

        let available = viewport_width.saturating_sub(frozen_width);
        let widths = flex_widths(tree, &scrolling, available);
        let mut left = 0;
        for ((index, key), width) in scrolling.iter().zip(widths) {
            columns.push(ColumnLayout {
                key: *key,
                index: *index,
                left,
                width,
                frozen: false,
                end: false,
            });
            left += width + 1;
        }
        let scroll_width = left;

        let mut headers = Vec::new();
        let last_pinned_root = pinned.iter().rev().find(|k| !tree.is_hidden(**k)).copied();
        for root in tree.roots() {
            collect_headers(tree, &columns, *root, 0, last_pinned_root, &mut headers);
        }

        Self {
            columns,
            headers,
            frozen_width,
            scroll_width,
            freeze,
        }
    }

    /// Layout of a leaf, `None` when hidden.
    pub fn column(&self, key: ColumnKey) -> Option<&ColumnLayout> {
        self.columns.iter().find(|c| c.key == key)
    }

    /// Layout of a header, `None` when hidden.
    pub fn header(&self, key: ColumnKey) -> Option<&HeaderLayout> {
        self.headers.iter().find(|h| h.key == key)
    }

    /// Pinned leaves.
    pub fn frozen(&self) -> impl Iterator<Item = &ColumnLayout> {
        self.columns.iter().filter(|c| c.frozen)
    }

    /// Scrollable leaves.
    pub fn scrolling(&self) -> impl Iterator<Item = &ColumnLayout> {
        self.columns.iter().filter(|c| !c.frozen)
    }

    /// Pinned leaf widths plus one pixel between each.
    pub fn frozen_span(&self) -> u32 {
        let (sum, count) = self.frozen().fold((0u32, 0u32), |(sum, count), c| (sum + c.width, count + 1));
        sum + count.saturating_sub(1)
    }
}

/// Clamps a freeze count into `[0, header_count - 1]`.
pub fn clamp_freeze(freeze: usize, header_count: usize) -> usize {
    freeze.min(header_count.saturating_sub(1))
}

fn flex_widths(tree: &ColumnTree, columns: &[(usize, ColumnKey)], available: u32) -> Vec<u32> {
    let mut widths: Vec<u32> = columns.iter().map(|(_, key)| tree.basis(*key)).collect();
    let used: u32 = widths.iter().map(|w| w + 1).sum();
    let flex: Vec<u32> = columns.iter().map(|(_, key)| tree.flex(*key)).collect();
    let total_flex: u32 = flex.iter().sum();
    if available <= used || total_flex == 0 {
        return widths;
    }

    let extra = available - used;
    let mut given = 0;
    for (width, grow) in widths.iter_mut().zip(&flex) {
        let share = (extra as u64 * *grow as u64 / total_flex as u64) as u32;
        *width += share;
        given += share;
    }
    if let Some(last) = flex.iter().rposition(|grow| *grow > 0) {
        widths[last] += extra - given;
    }
    widths
}

fn collect_headers(
    tree: &ColumnTree,
    columns: &[ColumnLayout],
    key: ColumnKey,
    depth: usize,
    last_pinned_root: Option<ColumnKey>,
    out: &mut Vec<HeaderLayout>,
) {
    let placed: Vec<&ColumnLayout> = tree
        .leaves_of(key)
        .into_iter()
        .filter_map(|leaf| columns.iter().find(|c| c.key == leaf))
        .collect();
    let (Some(first), Some(last)) = (placed.first(), placed.last()) else {
        return;
    };

    out.push(HeaderLayout {
        key,
        depth,
        left: first.left,
        width: last.right() - first.left,
        frozen: first.frozen,
        end: depth == 0 && Some(key) == last_pinned_root,
    });

    if let Some(column) = tree.get(key) {
        for child in &column.children {
            collect_headers(tree, columns, *child, depth + 1, last_pinned_root, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::grid::ColumnConfig;

    fn tree() -> ColumnTree {
        ColumnTree::new(
            &[
                ColumnConfig::new("A", "a").with_width(100),
                ColumnConfig::new("B", "b").with_min_width(50),
                ColumnConfig::new("C", "c").with_width(80),
            ],
            None,
        )
    }

    #[test]
    fn test_frozen_width_counts_one_pixel_per_pinned_column() {
        let layout = GridLayout::compute(&tree(), 1, 500);
        assert_eq!(layout.frozen_width, 101);
        assert_eq!(layout.frozen_span(), 100);
        assert!(layout.columns[0].end);
    }

    #[test]
    fn test_freeze_is_clamped() {
        let layout = GridLayout::compute(&tree(), 10, 500);
        assert_eq!(layout.freeze, 2);
        assert_eq!(layout.frozen().count(), 2);
        assert_eq!(layout.frozen_span(), 100 + 50 + 1);
    }

    #[test]
    fn test_flex_column_takes_remaining_width() {
        let layout = GridLayout::compute(&tree(), 1, 500);
        let b = layout.columns[1];
        let c = layout.columns[2];
        // 500 - 101 frozen = 399 available, fixed C takes 81
        assert_eq!(b.width, 399 - 81 - 1);
        assert_eq!(c.width, 80);
        assert_eq!(c.left, b.width + 1);
        assert_eq!(layout.scroll_width, 399);
    }

    #[test]
    fn test_narrow_viewport_keeps_basis() {
        let layout = GridLayout::compute(&tree(), 0, 100);
        let widths: Vec<u32> = layout.columns.iter().map(|c| c.width).collect();
        assert_eq!(widths, [100, 50, 80]);
    }
}
