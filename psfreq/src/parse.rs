use log::warn;

pub fn strip_line_terminator(line: &str) -> &str {
    line.strip_suffix("\r\n")
        .or_else(|| line.strip_suffix('\n'))
        .unwrap_or(line)
}

/// Parses a sysfs value, falling back to 0 when the text is not an integer.
pub fn to_int(line: &str) -> i64 {
    match line.trim().parse::<i64>() {
        Ok(value) => value,
        Err(_) => {
            warn!("Unable to convert `{}` to an integer, using 0", line);
            0
        }
    }
}

pub fn to_uint(line: &str) -> u64 {
    match line.trim().parse::<u64>() {
        Ok(value) => value,
        Err(_) => {
            warn!("Unable to convert `{}` to an unsigned integer, using 0", line);
            0
        }
    }
}

/// Whitespace-delimited list, e.g. `scaling_available_governors`.
pub fn split_words(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}
