//! ANSI colouring for pretty JSON written to a terminal

mod pie_colors {
    pub const GREY: u8 = 102;      // #7D7D7D -> 102
    pub const AQUA: u8 = 109;      // #7A9EB5 -> 109
    pub const ORANGE: u8 = 208;    // #F2913D -> 208
    pub const PINK: u8 = 176;      // #DE85DE -> 176
    pub const GREEN: u8 = 71;      // #63C27A -> 71
}

/// ANSI escape code helpers
mod ansi {
    pub const RESET: &str = "\x1b[0m";

    #[inline]
    pub fn fg256(color: u8) -> String {
        format!("\x1b[38;5;{}m", color)
    }
}

fn push_colored(result: &mut String, color: u8, text: &str) {
    result.push_str(&ansi::fg256(color));
    result.push_str(text);
    result.push_str(ansi::RESET);
}

/// Colour already formatted JSON text.
///
/// Keys are pink, string values green, numbers aqua, literals orange and
/// punctuation grey. Whitespace is preserved.
pub fn colorize_json(json: &str) -> String {
    let mut result = String::with_capacity(json.len() * 2);
    let mut chars = json.chars().peekable();
    let mut in_string = false;
    let mut escape_next = false;
    // true = object (expect keys), false = array (expect values)
    let mut context_stack: Vec<bool> = Vec::new();
    let mut expect_key = false;

    while let Some(c) = chars.next() {
        if escape_next {
            result.push(c);
            escape_next = false;
            continue;
        }

        if c == '\\' && in_string {
            result.push(c);
            escape_next = true;
            continue;
        }

        if c == '"' {
            if in_string {
                result.push(c);
                result.push_str(ansi::RESET);
                in_string = false;
            } else {
                in_string = true;
                let color = if expect_key { pie_colors::PINK } else { pie_colors::GREEN };
                result.push_str(&ansi::fg256(color));
                result.push(c);
            }
            continue;
        }

        if in_string {
            result.push(c);
            continue;
        }

        match c {
            '{' => {
                push_colored(&mut result, pie_colors::GREY, "{");
                context_stack.push(true);
                expect_key = true;
            }
            '[' => {
                push_colored(&mut result, pie_colors::GREY, "[");
                context_stack.push(false);
                expect_key = false;
            }
            '}' | ']' => {
                push_colored(&mut result, pie_colors::GREY, &c.to_string());
                context_stack.pop();
                expect_key = false;
            }
            ',' => {
                push_colored(&mut result, pie_colors::GREY, ",");
                expect_key = context_stack.last().copied().unwrap_or(false);
            }
            ':' => {
                push_colored(&mut result, pie_colors::GREY, ":");
                expect_key = false;
            }
            't' | 'f' | 'n' => {
                let mut word = String::from(c);
                while let Some(next) = chars.next_if(char::is_ascii_alphabetic) {
                    word.push(next);
                }
                if matches!(word.as_str(), "true" | "false" | "null") {
                    push_colored(&mut result, pie_colors::ORANGE, &word);
                } else {
                    result.push_str(&word);
                }
            }
            '0'..='9' | '-' => {
                let mut number = String::from(c);
                while let Some(next) = chars
                    .next_if(|n| n.is_ascii_digit() || matches!(n, '.' | 'e' | 'E' | '+' | '-'))
                {
                    number.push(next);
                }
                push_colored(&mut result, pie_colors::AQUA, &number);
            }
            _ => result.push(c),
        }
    }

    result.push_str(ansi::RESET);
    result
}
