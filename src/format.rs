//! 更新行格式化 — 列对齐与 Pango 着色标记

/// 版本类别调色板大小（major / minor / patch / pre / other）
pub const PALETTE_SIZE: usize = 5;

/// 格式化开关与调色板，由 Config 派生，整个进程内不变
#[derive(Debug, Clone)]
pub struct FormatOptions {
    pub raw_output: bool,
    pub no_color: bool,
    pub palette: [String; PALETTE_SIZE],
}

/// 就地重写待显示的更新行。
///
/// 恰好四个空白分隔 token（`name oldver -> newver`）的行参与列宽
/// 计算并被改写；其余行原样保留，但仍计入总数。no-color 时跳过
/// 着色但保留对齐，raw-output 时跳过对齐但保留着色。
pub fn format_updates(updates: &mut [String], opts: &FormatOptions) {
    let parts: Vec<Option<(String, String, String)>> = updates
        .iter()
        .map(|line| {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() == 4 {
                Some((
                    tokens[0].to_string(),
                    tokens[1].to_string(),
                    tokens[3].to_string(),
                ))
            } else {
                None
            }
        })
        .collect();

    let name_w = parts.iter().flatten().map(|p| p.0.len()).max().unwrap_or(0);
    let ver_w = parts.iter().flatten().map(|p| p.1.len()).max().unwrap_or(0);

    for (line, part) in updates.iter_mut().zip(&parts) {
        let Some((name, old, new)) = part else {
            continue;
        };
        if opts.no_color {
            *line = format!(
                "<span font-family='monospace'>{name:<name_w$} {old:<ver_w$} -> {new}</span>"
            );
            continue;
        }
        let color = &opts.palette[classify_delta(old, new)];
        *line = if opts.raw_output {
            format!("<span font-family='monospace' color='#{color}'>{name} {old} -> {new}</span>")
        } else {
            format!(
                "<span font-family='monospace' color='#{color}'>{name:<name_w$} {old:<ver_w$} -> {new}</span>"
            )
        };
    }
}

/// 比较新旧版本串，返回调色板下标（0=major .. 4=other）。
///
/// 逐字节扫描到较长一侧的末尾，统计新版本串中出现的 `.` 与 `-`
/// 分隔符，遇到首个差异位置（含该位置本身）即停；经过的分隔符
/// 越少说明变化越靠前、越重大。一侧提前结束同样视为差异；计数
/// 超出调色板范围时收敛到最后一档。
pub fn classify_delta(old: &str, new: &str) -> usize {
    let old = old.as_bytes();
    let new = new.as_bytes();
    let mut separators = 0;
    for i in 0..old.len().max(new.len()) {
        if matches!(new.get(i), Some(b'.') | Some(b'-')) {
            separators += 1;
        }
        if old.get(i) != new.get(i) {
            break;
        }
    }
    separators.min(PALETTE_SIZE - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(raw_output: bool, no_color: bool) -> FormatOptions {
        FormatOptions {
            raw_output,
            no_color,
            palette: [
                "f7768e".to_string(),
                "ff9e64".to_string(),
                "e0af68".to_string(),
                "9ece6a".to_string(),
                "7dcfff".to_string(),
            ],
        }
    }

    #[test]
    fn classify_major_on_first_byte() {
        assert_eq!(classify_delta("1.0.0", "2.0.0"), 0);
    }

    #[test]
    fn classify_minor_after_one_separator() {
        assert_eq!(classify_delta("1.0", "1.1"), 1);
    }

    #[test]
    fn classify_patch_after_two_separators() {
        assert_eq!(classify_delta("1.2.3", "1.2.4"), 2);
    }

    #[test]
    fn classify_counts_pkgrel_dash() {
        // pacman 风格的 pkgrel：1.2.3-1 -> 1.2.3-2
        assert_eq!(classify_delta("1.2.3-1", "1.2.3-2"), 3);
    }

    #[test]
    fn classify_clamps_to_last_palette_entry() {
        assert_eq!(classify_delta("1.2.3.4.5.6", "1.2.3.4.5.7"), 4);
    }

    #[test]
    fn classify_handles_unequal_lengths() {
        // 较短一侧结束即视为差异，不得越界；分隔符只统计新版本串
        assert_eq!(classify_delta("1.2", "1.2.3"), 2);
        assert_eq!(classify_delta("1.2.3", "1.2"), 1);
    }

    #[test]
    fn aligns_columns_and_colors_each_line() {
        let mut updates = vec![
            "pkgA 1.0 -> 1.1".to_string(),
            "longpkg 2.0.0 -> 2.0.1".to_string(),
        ];
        format_updates(&mut updates, &opts(false, false));
        assert_eq!(
            updates[0],
            "<span font-family='monospace' color='#ff9e64'>pkgA    1.0   -> 1.1</span>"
        );
        assert_eq!(
            updates[1],
            "<span font-family='monospace' color='#e0af68'>longpkg 2.0.0 -> 2.0.1</span>"
        );
    }

    #[test]
    fn no_color_keeps_alignment_without_color_attr() {
        let mut updates = vec![
            "pkgA 1.0 -> 1.1".to_string(),
            "longpkg 2.0.0 -> 2.0.1".to_string(),
        ];
        format_updates(&mut updates, &opts(false, true));
        assert_eq!(
            updates[0],
            "<span font-family='monospace'>pkgA    1.0   -> 1.1</span>"
        );
        assert!(!updates[0].contains("color"));
    }

    #[test]
    fn raw_output_keeps_single_spaces() {
        let mut updates = vec![
            "pkgA 1.0 -> 1.1".to_string(),
            "longpkg 2.0.0 -> 2.0.1".to_string(),
        ];
        format_updates(&mut updates, &opts(true, false));
        assert_eq!(
            updates[0],
            "<span font-family='monospace' color='#ff9e64'>pkgA 1.0 -> 1.1</span>"
        );
    }

    #[test]
    fn malformed_line_passes_through_unmodified() {
        let mut updates = vec![
            "Error querying AUR API: connection refused".to_string(),
            "pkgA 1.0 -> 1.1".to_string(),
        ];
        format_updates(&mut updates, &opts(false, false));
        assert_eq!(updates[0], "Error querying AUR API: connection refused");
        assert!(updates[1].starts_with("<span"));
    }
}
