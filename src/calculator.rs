// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

//! Four-function calculator evaluated strictly left to right.

use std::fmt;

use crate::error::InputError;

/// Significant digits shown when displaying the accumulator.
const DISPLAY_PRECISION: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    pub fn from_symbol(symbol: &str) -> Option<Operator> {
        match symbol {
            "+" => Some(Operator::Add),
            "-" | "−" => Some(Operator::Subtract),
            "*" | "×" => Some(Operator::Multiply),
            "/" | "÷" => Some(Operator::Divide),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
            Operator::Multiply => '*',
            Operator::Divide => '/',
        }
    }

    /// Division by exactly zero yields zero instead of infinity or NaN.
    fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            Operator::Add => lhs + rhs,
            Operator::Subtract => lhs - rhs,
            Operator::Multiply => lhs * rhs,
            Operator::Divide => {
                if rhs == 0.0 {
                    0.0
                } else {
                    lhs / rhs
                }
            }
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A calculator button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Digit(char),
    Operator(Operator),
    Evaluate,
    Clear,
    Backspace,
}

impl Key {
    /// Map a button label to a key.
    pub fn from_label(label: &str) -> Result<Key, InputError> {
        let label = label.trim();
        if let Some(op) = Operator::from_symbol(label) {
            return Ok(Key::Operator(op));
        }

        match label {
            "=" => Ok(Key::Evaluate),
            "C" | "c" => Ok(Key::Clear),
            "⌫" | "BS" | "bs" => Ok(Key::Backspace),
            _ => {
                let mut chars = label.chars();
                match (chars.next(), chars.next()) {
                    (Some(d), None) if d.is_ascii_digit() || d == '.' => Ok(Key::Digit(d)),
                    _ => Err(InputError::UnknownKey(label.to_string())),
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Calculator {
    pending: String,
    accumulator: f64,
    operator: Option<Operator>,
    just_evaluated: bool,
}

impl Calculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.accumulator = 0.0;
        self.operator = None;
        self.just_evaluated = false;
    }

    /// Append a digit or decimal point to the operand being typed.
    ///
    /// A digit right after `=` starts a fresh calculation. A second decimal
    /// point, or anything that is not a digit or `.`, is ignored.
    pub fn input_digit(&mut self, digit: char) {
        if digit != '.' && !digit.is_ascii_digit() {
            return;
        }
        if self.just_evaluated && digit.is_ascii_digit() {
            self.clear();
        }
        if digit == '.' && self.pending.contains('.') {
            return;
        }
        self.pending.push(digit);
        self.just_evaluated = false;
    }

    pub fn set_operator(&mut self, op: Operator) {
        if self.pending.is_empty() && self.operator.is_some() {
            self.operator = Some(op);
            return;
        }
        self.apply_pending();
        self.operator = Some(op);
        self.just_evaluated = false;
    }

    /// Finish the pending operation. A second `=` with nothing typed in
    /// between leaves the result as it is.
    pub fn evaluate(&mut self) -> f64 {
        if self.operator.is_some() || !self.pending.is_empty() {
            self.apply_pending();
        }
        self.operator = None;
        self.just_evaluated = true;
        self.accumulator
    }

    pub fn backspace(&mut self) {
        self.pending.pop();
    }

    /// Apply a button press.
    pub fn press(&mut self, key: Key) {
        match key {
            Key::Digit(d) => self.input_digit(d),
            Key::Operator(op) => self.set_operator(op),
            Key::Evaluate => {
                self.evaluate();
            }
            Key::Clear => self.clear(),
            Key::Backspace => self.backspace(),
        }
    }

    /// Text for the display: the operand being typed, or the accumulator.
    pub fn display(&self) -> String {
        if self.pending.is_empty() {
            format_display(self.accumulator)
        } else {
            self.pending.clone()
        }
    }

    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    pub fn operator(&self) -> Option<Operator> {
        self.operator
    }

    pub fn just_evaluated(&self) -> bool {
        self.just_evaluated
    }

    fn pending_value(&self) -> f64 {
        self.pending.parse().unwrap_or(0.0)
    }

    fn apply_pending(&mut self) {
        match self.operator {
            Some(op) => {
                let x = self.pending_value();
                self.accumulator = op.apply(self.accumulator, x);
            }
            None => self.accumulator = self.pending_value(),
        }
        self.pending.clear();
    }
}

/// Format a number with up to 12 significant digits, trailing zeros trimmed.
///
/// Mirrors C's `%.12g`: fixed notation for exponents in `-4..12`,
/// scientific notation otherwise.
pub fn format_display(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return value.to_string();
    }

    let scientific = format!("{:.*e}", DISPLAY_PRECISION - 1, value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };

    if exponent < -4 || exponent >= DISPLAY_PRECISION as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exponent.abs())
    } else {
        let decimals = (DISPLAY_PRECISION as i32 - 1 - exponent) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_fraction(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press_all(calc: &mut Calculator, labels: &[&str]) {
        for label in labels {
            calc.press(Key::from_label(label).unwrap());
        }
    }

    #[test]
    fn test_basic_addition() {
        let mut calc = Calculator::new();
        press_all(&mut calc, &["1", "2", "+", "8", "="]);
        assert_eq!(calc.display(), "20");
        assert!(calc.just_evaluated());
        assert_eq!(calc.operator(), None);
    }

    #[test]
    fn test_divide_by_zero_yields_zero() {
        let mut calc = Calculator::new();
        press_all(&mut calc, &["5", "/", "0", "="]);
        assert_eq!(calc.display(), "0");
        assert_eq!(calc.accumulator(), 0.0);
        assert!(calc.accumulator().is_finite());
    }

    #[test]
    fn test_left_to_right_no_precedence() {
        let mut calc = Calculator::new();
        press_all(&mut calc, &["2", "+", "3", "*", "4", "="]);
        assert_eq!(calc.display(), "20");
    }

    #[test]
    fn test_digits_accumulate_verbatim() {
        const KEYS: [char; 11] = ['0', '1', '2', '3', '4', '5', '6', '7', '8', '9', '.'];

        // Small LCG so every run types the same sequences.
        let mut seed: u64 = 0x2545_f491;
        let mut next = |bound: usize| {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((seed >> 33) as usize) % bound
        };

        for _ in 0..200 {
            let len = 1 + next(16);
            let mut typed: Vec<char> = (0..len).map(|_| KEYS[next(KEYS.len())]).collect();
            // At least two decimal points in every sequence.
            typed.insert(next(typed.len() + 1), '.');
            typed.insert(next(typed.len() + 1), '.');

            let mut expected = String::new();
            for &d in &typed {
                if d != '.' || !expected.contains('.') {
                    expected.push(d);
                }
            }

            let mut calc = Calculator::new();
            for &d in &typed {
                calc.input_digit(d);
            }
            let typed: String = typed.into_iter().collect();
            assert_eq!(calc.display(), expected, "typed {:?}", typed);
        }

        let mut calc = Calculator::new();
        for d in "0012.5.7".chars() {
            calc.input_digit(d);
        }
        assert_eq!(calc.display(), "0012.57");
    }

    #[test]
    fn test_non_digit_input_ignored() {
        let mut calc = Calculator::new();
        calc.input_digit('4');
        calc.input_digit('x');
        assert_eq!(calc.display(), "4");
    }

    #[test]
    fn test_operator_replacement() {
        let mut calc = Calculator::new();
        press_all(&mut calc, &["9", "+", "-", "*", "3", "="]);
        assert_eq!(calc.display(), "27");
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let mut calc = Calculator::new();
        press_all(&mut calc, &["7", "*", "6"]);
        let first = calc.evaluate();
        let second = calc.evaluate();
        assert_eq!(first, 42.0);
        assert_eq!(second, first);
        assert_eq!(calc.display(), "42");
    }

    #[test]
    fn test_digit_after_evaluate_starts_fresh() {
        let mut calc = Calculator::new();
        press_all(&mut calc, &["4", "+", "4", "=", "3"]);
        assert_eq!(calc.display(), "3");
        press_all(&mut calc, &["="]);
        assert_eq!(calc.display(), "3");
    }

    #[test]
    fn test_operator_after_evaluate_takes_empty_operand() {
        // With nothing typed, the operator loads 0 into the accumulator.
        let mut calc = Calculator::new();
        press_all(&mut calc, &["1", "2", "+", "8", "=", "+", "5", "="]);
        assert_eq!(calc.display(), "5");

        calc.clear();
        press_all(&mut calc, &["7", "=", ".", "BS", "*", "3", "="]);
        assert_eq!(calc.display(), "0");
    }

    #[test]
    fn test_repeated_equals_keeps_result() {
        let mut calc = Calculator::new();
        press_all(&mut calc, &["6", "=", "=", "="]);
        assert_eq!(calc.accumulator(), 6.0);
        assert_eq!(calc.display(), "6");
    }

    #[test]
    fn test_decimal_after_evaluate_continues_entry() {
        let mut calc = Calculator::new();
        press_all(&mut calc, &["1", "+", "1", "=", ".", "5"]);
        assert_eq!(calc.display(), ".5");
        assert!(!calc.just_evaluated());
    }

    #[test]
    fn test_backspace() {
        let mut calc = Calculator::new();
        press_all(&mut calc, &["1", "2", "3", "⌫"]);
        assert_eq!(calc.display(), "12");
        press_all(&mut calc, &["BS", "BS", "BS"]);
        assert_eq!(calc.display(), "0");
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut calc = Calculator::new();
        press_all(&mut calc, &["8", "*", "2", "=", "C"]);
        assert_eq!(calc.display(), "0");
        assert_eq!(calc.accumulator(), 0.0);
        assert_eq!(calc.operator(), None);
        assert!(!calc.just_evaluated());
    }

    #[test]
    fn test_unknown_key() {
        assert_eq!(
            Key::from_label("%"),
            Err(InputError::UnknownKey("%".to_string()))
        );
        assert_eq!(
            Key::from_label("12"),
            Err(InputError::UnknownKey("12".to_string()))
        );
        assert_eq!(Key::from_label("×"), Ok(Key::Operator(Operator::Multiply)));
    }

    #[test]
    fn test_format_display() {
        assert_eq!(format_display(20.0), "20");
        assert_eq!(format_display(-0.0), "0");
        assert_eq!(format_display(0.1 + 0.2), "0.3");
        assert_eq!(format_display(1.0 / 3.0), "0.333333333333");
        assert_eq!(format_display(2.5), "2.5");
        assert_eq!(format_display(-1234.5), "-1234.5");
        assert_eq!(format_display(123456789012.0), "123456789012");
        assert_eq!(format_display(1e12), "1e+12");
        assert_eq!(format_display(1.5e20), "1.5e+20");
        assert_eq!(format_display(0.0001), "0.0001");
        assert_eq!(format_display(0.00001), "1e-05");
    }
}
