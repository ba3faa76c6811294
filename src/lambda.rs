use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::types::LambdaPair;

/// Reads the sweep order from a λ-list file. An unopenable file is reported
/// and yields an empty sweep.
pub fn read_lambda_list(path: &Path) -> Vec<LambdaPair> {
    match File::open(path) {
        Ok(file) => parse_lambda_list(BufReader::new(file)),
        Err(e) => {
            log::error!("Unable to open the file. ('{}': {e})", path.display());
            Vec::new()
        }
    }
}

/// One pair per line: the first two numbers on it. Lines that do not start
/// with two usable numbers are dropped; file order is kept. Bytes that are not
/// valid UTF-8 only spoil their own line.
pub fn parse_lambda_list<R: BufRead>(reader: R) -> Vec<LambdaPair> {
    let mut pairs = Vec::new();
    for (line_no, chunk) in reader.split(b'\n').enumerate() {
        let bytes = match chunk {
            Ok(b) => b,
            Err(e) => {
                log::warn!("stopped reading lambda list at line {}: {e}", line_no + 1);
                break;
            }
        };
        let line = String::from_utf8_lossy(&bytes);
        match parse_pair(&line) {
            Some(pair) => pairs.push(pair),
            None if line.trim().is_empty() => {}
            None => log::debug!("dropping lambda list line {}: {line:?}", line_no + 1),
        }
    }
    pairs
}

/// Values are read at single precision and widened, so labels match lists
/// written for the single-precision reader.
fn parse_pair(line: &str) -> Option<LambdaPair> {
    let (lambda1, rest) = read_float(line)?;
    let (lambda2, _) = read_float(rest)?;
    LambdaPair::new(f64::from(lambda1), f64::from(lambda2)).ok()
}

/// Skips leading whitespace and consumes the longest decimal prefix
/// (`[+-]digits[.digits][e[+-]digits]`). Anything after it is left for the
/// next read, so `0.2abc` reads as `0.2`.
fn read_float(input: &str) -> Option<(f32, &str)> {
    let s = input.trim_start();
    let b = s.as_bytes();
    let mut end = usize::from(matches!(b.first(), Some(b'+' | b'-')));
    let int_digits = count_digits(&b[end..]);
    end += int_digits;
    let mut frac_digits = 0;
    if b.get(end) == Some(&b'.') {
        frac_digits = count_digits(&b[end + 1..]);
        end += 1 + frac_digits;
    }
    if int_digits + frac_digits == 0 {
        return None;
    }
    if matches!(b.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(b.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&b[exp_end..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }
    let value = s[..end].parse::<f32>().ok()?;
    Some((value, &s[end..]))
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|c| c.is_ascii_digit()).count()
}
