use crate::error::{Error, Result};
use crate::model::Vec2;

/// Absolute path command as parsed from path data.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    MoveTo(Vec2),
    LineTo(Vec2),
    Quad(Vec2, Vec2),
    Cubic(Vec2, Vec2, Vec2),
    Close,
}

impl PathCommand {
    /// Points in drawing order (control points first, end point last).
    pub fn points(&self) -> Vec<Vec2> {
        match *self {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => vec![p],
            PathCommand::Quad(c, p) => vec![c, p],
            PathCommand::Cubic(c1, c2, p) => vec![c1, c2, p],
            PathCommand::Close => Vec::new(),
        }
    }
}

/// Format a coordinate the way the browser prints numbers (no `-0`).
pub fn fmt_num(v: f64) -> String {
    if v == 0.0 {
        "0".to_string()
    } else {
        format!("{}", v)
    }
}

/// Serialize one curve: optional moveto to the first point, then `Q` for
/// three points or `C` for four. Other point counts emit only the moveto.
pub fn to_path_command(points: &[Vec2], is_first: bool) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(9);
    if is_first {
        if let Some(p) = points.first() {
            parts.push("M".to_string());
            parts.push(fmt_num(p.x));
            parts.push(fmt_num(p.y));
        }
    }
    let letter = match points.len() {
        3 => Some("Q"),
        4 => Some("C"),
        _ => None,
    };
    if let Some(letter) = letter {
        parts.push(letter.to_string());
        for p in &points[1..] {
            parts.push(fmt_num(p.x));
            parts.push(fmt_num(p.y));
        }
    }
    parts.join(" ")
}

/// Parse `M/L/Q/C/Z` path data (absolute or relative) into absolute commands.
pub fn parse_path(d: &str) -> Result<Vec<PathCommand>> {
    let bytes = d.as_bytes();
    let mut i = 0usize;
    let mut out = Vec::new();
    let mut cur = Vec2::ZERO;
    let mut start_sub = Vec2::ZERO;
    let mut last_cmd: Option<u8> = None;

    loop {
        skip_ws(bytes, &mut i);
        if i >= bytes.len() {
            break;
        }
        let c = bytes[i];
        let cmd = if c.is_ascii_alphabetic() && c != b'e' && c != b'E' {
            i += 1;
            c
        } else {
            // implicit repeat; extra moveto pairs are linetos
            match last_cmd {
                Some(b'M') => b'L',
                Some(b'm') => b'l',
                Some(b'Z') | Some(b'z') | None => {
                    return Err(parse_error(i, "coordinates without a command"));
                }
                Some(prev) => prev,
            }
        };
        last_cmd = Some(cmd);
        let base = if cmd.is_ascii_lowercase() { cur } else { Vec2::ZERO };
        match cmd.to_ascii_uppercase() {
            b'M' => {
                let p = base + read_point(bytes, &mut i)?;
                cur = p;
                start_sub = p;
                out.push(PathCommand::MoveTo(p));
            }
            b'L' => {
                let p = base + read_point(bytes, &mut i)?;
                cur = p;
                out.push(PathCommand::LineTo(p));
            }
            b'Q' => {
                let c1 = base + read_point(bytes, &mut i)?;
                let p = base + read_point(bytes, &mut i)?;
                cur = p;
                out.push(PathCommand::Quad(c1, p));
            }
            b'C' => {
                let c1 = base + read_point(bytes, &mut i)?;
                let c2 = base + read_point(bytes, &mut i)?;
                let p = base + read_point(bytes, &mut i)?;
                cur = p;
                out.push(PathCommand::Cubic(c1, c2, p));
            }
            b'Z' => {
                cur = start_sub;
                out.push(PathCommand::Close);
            }
            _ => {
                return Err(parse_error(i - 1, format!("unsupported command '{}'", cmd as char)));
            }
        }
    }
    Ok(out)
}

/// Every point of every command, in order.
pub fn path_points(commands: &[PathCommand]) -> Vec<Vec2> {
    commands.iter().flat_map(|c| c.points()).collect()
}

fn parse_error(offset: usize, message: impl Into<String>) -> Error {
    Error::PathParse { offset, message: message.into() }
}

fn skip_ws(bytes: &[u8], i: &mut usize) {
    while *i < bytes.len() {
        let c = bytes[*i];
        if c == b' ' || c == b'\n' || c == b'\r' || c == b'\t' || c == b',' {
            *i += 1;
        } else {
            break;
        }
    }
}

fn parse_num(bytes: &[u8], i: &mut usize) -> Option<f64> {
    skip_ws(bytes, i);
    let start = *i;
    let mut prev: Option<u8> = None;
    while *i < bytes.len() {
        let c = bytes[*i];
        let sign_ok = (c == b'-' || c == b'+') && (*i == start || matches!(prev, Some(b'e') | Some(b'E')));
        if c.is_ascii_digit() || c == b'.' || c == b'e' || c == b'E' || sign_ok {
            prev = Some(c);
            *i += 1;
        } else {
            break;
        }
    }
    if *i == start {
        return None;
    }
    let v = std::str::from_utf8(&bytes[start..*i]).ok()?.parse::<f64>().ok()?;
    v.is_finite().then_some(v)
}

fn read_point(bytes: &[u8], i: &mut usize) -> Result<Vec2> {
    let x = parse_num(bytes, i).ok_or_else(|| parse_error(*i, "expected x coordinate"))?;
    let y = parse_num(bytes, i).ok_or_else(|| parse_error(*i, "expected y coordinate"))?;
    Ok(Vec2::new(x, y))
}
