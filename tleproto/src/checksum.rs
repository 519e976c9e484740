use crate::LINE_LENGTH;

/// Modulo 10 sum over columns 1-68: digits count their value, '-' counts one,
/// everything else counts zero.
pub fn checksum(line: &str) -> u8 {
    let sum: u32 = line
        .bytes()
        .take(LINE_LENGTH - 1)
        .map(|b| match b {
            b'0'..=b'9' => u32::from(b - b'0'),
            b'-' => 1,
            _ => 0,
        })
        .sum();
    (sum % 10) as u8
}

/// Pads or truncates `line` to 68 columns and appends its checksum digit
pub fn with_checksum(line: &str) -> String {
    let mut out: String = line.chars().take(LINE_LENGTH - 1).collect();
    while out.chars().count() < LINE_LENGTH - 1 {
        out.push(' ');
    }
    let digit = checksum(&out);
    out.push(char::from(b'0' + digit));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const ISS_LINE1: &str = "1 25544U 98067A   19343.69339541  .00001764  00000-0  38792-4 0  9991";
    const ISS_LINE2: &str = "2 25544  51.6439 211.2001 0007417  17.6667  85.6398 15.50103472202482";

    #[test]
    fn known_lines() {
        assert_eq!(checksum(ISS_LINE1), 1);
        assert_eq!(checksum(ISS_LINE2), 2);
    }

    #[test]
    fn minus_signs_count_one() {
        assert_eq!(checksum("1 -"), 2);
        assert_eq!(checksum("+.ABC"), 0);
    }

    #[test]
    fn checksum_column_is_ignored() {
        let mut line = ISS_LINE1[..68].to_string();
        line.push('7');
        assert_eq!(checksum(&line), checksum(ISS_LINE1));
    }

    #[test]
    fn appends_digit() {
        assert_eq!(with_checksum(&ISS_LINE2[..68]), ISS_LINE2);
        assert_eq!(with_checksum(ISS_LINE2), ISS_LINE2);

        let padded = with_checksum("1 00001U");
        assert_eq!(padded.len(), 69);
        assert!(padded.starts_with("1 00001U   "));
        assert_eq!(padded.as_bytes()[68], b'2');
    }
}
