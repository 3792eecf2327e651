//! Longest-common-subsequence line diff.

use super::delta::Hunk;

/// Split text into lines, each keeping its `\n` terminator.
///
/// A final line without a terminator is kept as is, so joining the result
/// reproduces the input byte for byte.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

/// Hunks turning `old` into `new`.
///
/// The common prefix and suffix are trimmed before the quadratic table is
/// built. If the remaining window needs more than `max_cells` table cells,
/// the whole window becomes one replace hunk.
pub fn diff_lines(old: &[&str], new: &[&str], max_cells: u64) -> Vec<Hunk> {
    let prefix = old
        .iter()
        .zip(new.iter())
        .take_while(|(a, b)| a == b)
        .count();
    let suffix = old[prefix..]
        .iter()
        .rev()
        .zip(new[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    let a = &old[prefix..old.len() - suffix];
    let b = &new[prefix..new.len() - suffix];

    if a.is_empty() && b.is_empty() {
        return Vec::new();
    }

    let cells = (a.len() as u64 + 1).saturating_mul(b.len() as u64 + 1);
    if a.is_empty() || b.is_empty() || cells > max_cells {
        return vec![Hunk {
            old_start: prefix,
            new_start: prefix,
            old_lines: owned(a),
            new_lines: owned(b),
        }];
    }

    walk(a, b, &lcs_table(a, b), prefix)
}

/// `table[i * (m + 1) + j]` is the LCS length of `a[i..]` and `b[j..]`.
fn lcs_table(a: &[&str], b: &[&str]) -> Vec<u32> {
    let (n, m) = (a.len(), b.len());
    let width = m + 1;
    let mut table = vec![0u32; (n + 1) * width];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            table[i * width + j] = if a[i] == b[j] {
                table[(i + 1) * width + j + 1] + 1
            } else {
                table[(i + 1) * width + j].max(table[i * width + j + 1])
            };
        }
    }
    table
}

fn walk(a: &[&str], b: &[&str], table: &[u32], offset: usize) -> Vec<Hunk> {
    let (n, m) = (a.len(), b.len());
    let width = m + 1;
    let mut hunks = Vec::new();
    let mut current: Option<Hunk> = None;
    let (mut i, mut j) = (0, 0);

    while i < n || j < m {
        if i < n && j < m && a[i] == b[j] {
            if let Some(hunk) = current.take() {
                hunks.push(hunk);
            }
            i += 1;
            j += 1;
            continue;
        }

        let hunk = current.get_or_insert_with(|| Hunk {
            old_start: offset + i,
            new_start: offset + j,
            old_lines: Vec::new(),
            new_lines: Vec::new(),
        });
        let delete = j == m || (i < n && table[(i + 1) * width + j] >= table[i * width + j + 1]);
        if delete {
            hunk.old_lines.push(a[i].to_string());
            i += 1;
        } else {
            hunk.new_lines.push(b[j].to_string());
            j += 1;
        }
    }

    hunks.extend(current);
    hunks
}

fn owned(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|l| (*l).to_string()).collect()
}
