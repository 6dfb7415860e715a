// Naive HTML string helpers, enough for the flat tables the injury pages serve.
// Tag and attribute matching is ASCII case-insensitive.

pub fn to_lower(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii() { c.to_ascii_lowercase() } else { c })
        .collect()
}

/// Find the next complete `<open ...>...</close>` block at or after `from`.
/// Returns byte offsets of the block start and one past its end.
pub fn next_tag_block_ci(s: &str, open_tag: &str, close_tag: &str, from: usize) -> Option<(usize, usize)> {
    let lc = to_lower(s);
    next_block_in_lower(s, &lc, &to_lower(open_tag), &to_lower(close_tag), from)
}

fn next_block_in_lower(
    s: &str,
    lc: &str,
    open_lc: &str,
    close_lc: &str,
    from: usize,
) -> Option<(usize, usize)> {
    let start = lc.get(from..)?.find(open_lc)? + from;
    let open_end = s[start..].find('>')? + start + 1;
    let end_rel = lc[open_end..].find(close_lc)?;
    Some((start, open_end + end_rel + close_lc.len()))
}

/// `<td class="x">INNER</td>` -> `INNER` (nested tags kept).
pub fn inner_after_open_tag(block: &str) -> &str {
    if let (Some(open_end), Some(close_start)) = (block.find('>'), block.rfind('<')) {
        if close_start > open_end {
            return &block[open_end + 1..close_start];
        }
    }
    ""
}

/// Locate the table whose opening tag carries `id="<id>"` and return the whole
/// `<table ...>...</table>` block.
pub fn table_by_id<'a>(page: &'a str, id: &str) -> Option<&'a str> {
    let lc = to_lower(page);
    let id_lc = to_lower(id);
    let needles = [
        format!("id=\"{id_lc}\""),
        format!("id='{id_lc}'"),
        format!("id={id_lc}>"),
        format!("id={id_lc} "),
    ];
    let attr = needles.iter().filter_map(|n| lc.find(n.as_str())).min()?;
    let start = lc[..attr].rfind("<table")?;
    // The id must sit inside the table's own opening tag.
    if lc[start..attr].contains('>') {
        return None;
    }
    let end = lc[attr..].find("</table>")? + attr + "</table>".len();
    Some(&page[start..end])
}

/// Text content of each `<td>`/`<th>` cell in a row, in document order.
pub fn row_cells(row: &str) -> Vec<String> {
    let lc = to_lower(row);
    let mut out = Vec::new();
    let mut pos = 0usize;
    loop {
        let td = next_block_in_lower(row, &lc, "<td", "</td>", pos);
        let th = next_block_in_lower(row, &lc, "<th", "</th>", pos);
        let next = match (td, th) {
            (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
            (a, b) => a.or(b),
        };
        let Some((start, end)) = next else {
            break;
        };
        out.push(cell_text(inner_after_open_tag(&row[start..end])));
        pos = end;
    }
    out
}

pub fn cell_text(fragment: &str) -> String {
    normalize_ws(&decode_entities(&strip_tags(fragment)))
}

pub fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

pub fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_in_order_mixed_th_td() {
        let row = r#"<tr><th scope="row"><a href="/p/1">Saka</a></th><td>Hamstring&nbsp;</td><TD>Late  Oct</TD></tr>"#;
        assert_eq!(row_cells(row), vec!["Saka", "Hamstring", "Late Oct"]);
    }

    #[test]
    fn table_by_id_ignores_other_tables() {
        let page = r#"<table id="stats"><tr><td>1</td></tr></table>
            <div><TABLE class="x" ID="injuries"><tr><td>2</td></tr></TABLE></div>"#;
        let table = table_by_id(page, "injuries").unwrap();
        assert!(table.contains("<td>2</td>"));
        assert!(!table.contains("<td>1</td>"));
    }

    #[test]
    fn table_by_id_missing() {
        assert!(table_by_id("<table id=\"stats\"></table>", "injuries").is_none());
        assert!(table_by_id("<div id=\"injuries\"></div>", "injuries").is_none());
    }

    #[test]
    fn entities_decoded_once() {
        assert_eq!(decode_entities("A &amp;lt; B"), "A &lt; B");
    }
}
