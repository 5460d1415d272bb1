use super::*;

#[test]
fn object_text_layout() {
    let image = ObjectImage::from(1, 0, vec![(100, 0b1111000000)]);
    let mut out = Vec::new();

    write_object(&mut out, &image).unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), "\taab\taa\nbcba\tddaaa\n");
}

#[test]
fn symbol_record_layout() {
    let records = vec![("MAIN", 100), ("K", 101)];
    let mut out = Vec::new();

    write_symbol_records(&mut out, &records).unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), "MAIN\tbcba\nK\tbcbb\n");
}

#[test]
fn write_read() {
    let path = "test.ob";

    let image = ObjectImage::from(
        4,
        2,
        vec![
            (100, 0b0000011100),
            (101, 0b0110100010),
            (102, 0b0000000100),
            (103, 0b1111000000),
            (104, 0b0000000101),
            (105, 0b1111111101),
        ],
    );

    write_object_file(path, &image).unwrap();

    let image_read = read_object_file(path).unwrap();

    assert_eq!(image, image_read);

    std::fs::remove_file(path).unwrap();
}

#[test]
fn read_rejects_garbage() {
    let mut input = BufReader::new("\taab\taa\nbcba\tddaXa\n".as_bytes());
    assert!(read_object(&mut input).is_err());

    let mut empty = BufReader::new("".as_bytes());
    assert!(read_object(&mut empty).is_err());
}
