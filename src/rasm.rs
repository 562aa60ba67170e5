// rasm: the consonantal skeleton of a token over the 18 archigraphemes

pub const ARCHIGRAPHEMES: &str = "ABGDRSCTEFQKLMNHWY";

// letters that never connect to the following letter, so a letter block ends after them
pub const BLOCK_FINAL: &str = "ARDW";

pub const EMPTY_SET: char = '∅';
pub const LINE_FILLER: char = '―';
pub const WORD_SEPARATOR: char = '#';

pub fn is_archigrapheme(c: char) -> bool {
    ARCHIGRAPHEMES.contains(c)
}

pub fn is_block_final(c: char) -> bool {
    BLOCK_FINAL.contains(c)
}

pub fn skeleton(token: &str) -> String {
    token.chars().filter(|&c| is_archigrapheme(c)).collect()
}

// "WAMB" => ["W", "A", "MB"]
// a trailing block final letter does not produce an empty block
pub fn split_blocks(skeleton: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut buffer = String::new();
    for c in skeleton.chars() {
        buffer.push(c);
        if is_block_final(c) {
            blocks.push(std::mem::take(&mut buffer));
        }
    }
    if !buffer.is_empty() {
        blocks.push(buffer);
    }
    blocks
}

// skeleton without its last letter, when that letter is an alif
pub fn strip_final_alif(skeleton: &str) -> Option<&str> {
    skeleton.strip_suffix('A')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skeleton_drops_everything_but_archigraphemes() {
        assert_eq!(skeleton("B’’ᵃE’ᵒF’ᵘLᵘWN’ᵃ"), "BEFLWN");
        assert_eq!(skeleton("∅A"), "A");
        assert_eq!(skeleton("2-3r"), "");
        assert_eq!(skeleton("ᵃ←↑!"), "");
    }

    #[test]
    fn skeleton_of_plain_text_is_identity() {
        assert_eq!(skeleton("KLM"), "KLM");
    }

    #[test]
    fn split_blocks_breaks_after_block_final_letters() {
        assert_eq!(split_blocks("WAMBEBKM"), vec!["W", "A", "MBEBKM"]);
        assert_eq!(split_blocks("BGD"), vec!["BGD"]);
        assert_eq!(split_blocks("LKM"), vec!["LKM"]);
        assert!(split_blocks("").is_empty());
    }

    #[test]
    fn strip_final_alif_only_strips_alif() {
        assert_eq!(strip_final_alif("LFA"), Some("LF"));
        assert_eq!(strip_final_alif("LF"), None);
    }
}
