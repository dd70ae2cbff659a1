// Copyright (C) 2025 Kevin Exton
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
//! Form-level validity checks for registration and password reset.

/// Special characters accepted by the password-strength rule.
const SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";

/// A password is valid iff it is at least 8 characters long and contains at
/// least one uppercase letter, one lowercase letter, one digit, and one
/// character from [`SPECIAL_CHARS`]. The five conditions are independent.
pub fn is_valid_password(p: &str) -> bool {
    p.chars().count() >= 8
        && p.chars().any(|c| c.is_ascii_uppercase())
        && p.chars().any(|c| c.is_ascii_lowercase())
        && p.chars().any(|c| c.is_ascii_digit())
        && p.chars().any(|c| SPECIAL_CHARS.contains(c))
}

/// A phone number is valid iff it consists of exactly 10 decimal digits.
pub fn is_valid_phone(num: &str) -> bool {
    num.len() == 10 && num.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_password_accepted() {
        assert!(is_valid_password("Abcdef1!"));
        assert!(is_valid_password("Str0ng,pass"));
    }

    #[test]
    fn test_password_missing_any_class_rejected() {
        // Each candidate satisfies all conditions except one.
        assert!(!is_valid_password("Ab1!xyz")); // too short
        assert!(!is_valid_password("abcdef1!")); // no uppercase
        assert!(!is_valid_password("ABCDEF1!")); // no lowercase
        assert!(!is_valid_password("Abcdefg!")); // no digit
        assert!(!is_valid_password("Abcdefg1")); // no special char
        assert!(!is_valid_password(""));
    }

    #[test]
    fn test_every_special_char_counts() {
        for c in SPECIAL_CHARS.chars() {
            let p = format!("Abcdef1{c}");
            assert!(is_valid_password(&p), "special char {c:?} not accepted");
        }
    }

    #[test]
    fn test_valid_phone() {
        assert!(is_valid_phone("9876543210"));
        assert!(!is_valid_phone("987654321")); // 9 digits
        assert!(!is_valid_phone("98765432100")); // 11 digits
        assert!(!is_valid_phone("987654321x"));
        assert!(!is_valid_phone("98765 4321"));
        assert!(!is_valid_phone(""));
    }
}
