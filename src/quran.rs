// number of verses of every sura in the Cairo edition
static VERSE_COUNTS: [u32; 114] = [
    7, 286, 200, 176, 120, 165, 206, 75, 129, 109, // 1-10
    123, 111, 43, 52, 99, 128, 111, 110, 98, 135, // 11-20
    112, 78, 118, 64, 77, 227, 93, 88, 69, 60, // 21-30
    34, 30, 73, 54, 45, 83, 182, 88, 75, 85, // 31-40
    54, 53, 89, 59, 37, 35, 38, 29, 18, 45, // 41-50
    60, 49, 62, 55, 78, 96, 29, 22, 24, 13, // 51-60
    14, 11, 11, 18, 12, 12, 30, 52, 52, 44, // 61-70
    28, 28, 20, 56, 40, 31, 50, 40, 46, 42, // 71-80
    29, 19, 36, 25, 22, 17, 19, 26, 30, 20, // 81-90
    15, 21, 11, 8, 8, 19, 5, 8, 8, 11, // 91-100
    11, 8, 3, 9, 5, 4, 7, 3, 6, 3, // 101-110
    5, 4, 5, 6, // 111-114
];

pub const SURA_COUNT: u32 = 114;

pub fn verse_count(sura: u32) -> Option<u32> {
    if sura == 0 {
        return None;
    }
    VERSE_COUNTS.get(sura as usize - 1).copied()
}

pub fn is_valid_position(sura: u32, verse: u32) -> bool {
    match verse_count(sura) {
        Some(count) => 1 <= verse && verse <= count,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verse_counts() {
        assert_eq!(verse_count(1), Some(7));
        assert_eq!(verse_count(2), Some(286));
        assert_eq!(verse_count(114), Some(6));
        assert_eq!(verse_count(0), None);
        assert_eq!(verse_count(115), None);
        assert_eq!(VERSE_COUNTS.iter().sum::<u32>(), 6236);
    }

    #[test]
    fn positions() {
        assert!(is_valid_position(1, 7));
        assert!(!is_valid_position(1, 8));
        assert!(!is_valid_position(999, 1));
    }
}
