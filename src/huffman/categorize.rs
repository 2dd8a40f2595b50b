/// A coefficient as JPEG variable-length integer: a category (bit count of
/// the magnitude) and the `category` low bits that follow the Huffman code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CategoryEncodedInteger {
    pub category: u8,
    pub pattern: u16,
}

impl CategoryEncodedInteger {
    pub fn category_of(value: i32) -> u8 {
        (u32::BITS - value.unsigned_abs().leading_zeros()) as u8
    }

    fn calculate_pattern_of(value: i32, category: u8) -> u16 {
        if value >= 0 {
            return value as u16;
        }
        // negative values are sent as the one's complement of the magnitude
        let mask = (1_u32 << category) - 1;
        ((value - 1) as u32 & mask) as u16
    }
}

impl From<i32> for CategoryEncodedInteger {
    fn from(value: i32) -> Self {
        let category = Self::category_of(value);
        CategoryEncodedInteger {
            category,
            pattern: Self::calculate_pattern_of(value, category),
        }
    }
}

/// The AC symbol for `zeros_before` zero coefficients followed by a
/// coefficient of `category`.
pub fn run_length_symbol(zeros_before: u8, category: u8) -> u8 {
    (zeros_before << 4) | category
}

#[cfg(test)]
mod test {
    use super::{run_length_symbol, CategoryEncodedInteger};

    #[test]
    fn test_categorize_integer() {
        let expected = [
            CategoryEncodedInteger {
                category: 6,
                pattern: 0b111001,
            },
            CategoryEncodedInteger {
                category: 6,
                pattern: 0b101101,
            },
            CategoryEncodedInteger {
                category: 1,
                pattern: 0b1,
            },
            CategoryEncodedInteger {
                category: 5,
                pattern: 0b00001,
            },
            CategoryEncodedInteger {
                category: 1,
                pattern: 0b0,
            },
        ];
        let input = [57, 45, 1, -30, -1];
        for (index, (&value, expected)) in input.iter().zip(expected).enumerate() {
            let actual = CategoryEncodedInteger::from(value);
            assert_eq!(expected, actual, "Encoding does not match at index {}", index);
        }
    }

    #[test]
    fn test_categorize_integer_zero() {
        let actual = CategoryEncodedInteger::from(0);
        assert_eq!(actual.category, 0);
        assert_eq!(actual.pattern, 0);
    }

    #[test]
    fn test_category_boundaries() {
        assert_eq!(CategoryEncodedInteger::category_of(1023), 10);
        assert_eq!(CategoryEncodedInteger::category_of(-1024), 11);
        assert_eq!(CategoryEncodedInteger::category_of(2047), 11);
    }

    #[test]
    fn test_run_length_symbol() {
        assert_eq!(run_length_symbol(0, 0), 0x00);
        assert_eq!(run_length_symbol(15, 0), 0xF0);
        assert_eq!(run_length_symbol(3, 10), 0x3A);
    }
}
