use super::*;

#[test]
fn test_line_map_offsets() {
    let source = "ab\ncd\r\nef\rgh";
    let map = LineMap::build(source);

    assert_eq!(map.offset_to_position(0, source), Position::new(0, 0));
    assert_eq!(map.offset_to_position(4, source), Position::new(1, 1));
    assert_eq!(map.offset_to_position(7, source), Position::new(2, 0));
    assert_eq!(map.offset_to_position(10, source), Position::new(3, 0));
}

#[test]
fn test_offset_past_end_clamps() {
    let source = "abc";
    let map = LineMap::build(source);
    assert_eq!(map.offset_to_position(100, source), Position::new(0, 3));
}

#[test]
fn test_multibyte_characters_count_as_one() {
    let source = "äö = 1";
    let map = LineMap::build(source);
    // 'ä' and 'ö' are two bytes each
    assert_eq!(map.offset_to_position(4, source), Position::new(0, 2));
}

#[test]
fn test_position_display_is_one_based() {
    assert_eq!(Position::new(0, 0).to_string(), "1:1");
}

#[test]
fn test_is_identifier() {
    assert!(is_identifier("Something"));
    assert!(is_identifier("_private_1"));
    assert!(!is_identifier(""));
    assert!(!is_identifier("1abc"));
    assert!(!is_identifier("a.b"));
}
