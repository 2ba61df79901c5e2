use roffio::{
    from_slice, lazy_read, lazy_read_path, read, read_path, read_with_options, roff, to_vec,
    to_vec_with_options, write, write_path, Array, Endianness, Error, FileMode, Format,
    OneOrMany, ReadOptions, RoffWriter, Value, Warning, WriteOptions,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{Cursor, Seek, SeekFrom, Write};

#[derive(Serialize)]
struct Dimensions {
    #[serde(rename = "nX")]
    nx: i32,
    #[serde(rename = "nY")]
    ny: i32,
    #[serde(rename = "nZ")]
    nz: i32,
}

#[derive(Serialize)]
struct Corners {
    data: Vec<f32>,
}

#[derive(Serialize)]
struct Active {
    data: Vec<bool>,
}

#[derive(Serialize)]
struct Grid {
    dimensions: Dimensions,
    #[serde(rename = "cornerLines")]
    corner_lines: Corners,
    active: Active,
}

fn grid() -> Grid {
    Grid {
        dimensions: Dimensions { nx: 2, ny: 2, nz: 1 },
        corner_lines: Corners {
            data: (0..36).map(|i| i as f32 * 0.5).collect(),
        },
        active: Active {
            data: vec![true, false, true, true],
        },
    }
}

fn strip_metadata(mut data: roffio::RoffData) -> roffio::RoffData {
    data.remove("filedata");
    data.remove("version");
    data.remove("eof");
    data
}

#[test]
fn test_grid_roundtrip_both_formats() {
    for format in [Format::Binary, Format::Ascii] {
        let bytes = to_vec(&grid(), format).unwrap();
        let data = from_slice(&bytes).unwrap();
        let dimensions = data.get_tag("dimensions").unwrap();
        assert_eq!(dimensions.get_value("nZ"), Some(&Value::Int(1)));
        let corners = data.get_tag("cornerLines").unwrap().get_value("data");
        assert_eq!(
            corners.and_then(Value::as_array).map(Array::len),
            Some(36)
        );
        assert_eq!(
            data.get_tag("active").unwrap().get_value("data"),
            Some(&Value::from(vec![true, false, true, true]))
        );
    }
}

#[test]
fn test_metadata_is_injected() {
    let bytes = to_vec(&roff! { "t" => { "x" => 1 } }, Format::Binary).unwrap();
    let data = from_slice(&bytes).unwrap();
    assert_eq!(
        data.keys().collect::<Vec<_>>(),
        vec!["filedata", "version", "t", "eof"]
    );
    let version = data.get_tag("version").unwrap();
    assert_eq!(version.get_value("major"), Some(&Value::Int(2)));
    assert_eq!(version.get_value("minor"), Some(&Value::Int(0)));
    let filedata = data.get_tag("filedata").unwrap();
    assert_eq!(filedata.get_value("byteswaptest"), Some(&Value::Int(1)));
    let date = filedata.get_value("creationDate").and_then(Value::as_str).unwrap();
    // dd/mm/YYYY HH:MM:SS
    assert_eq!(date.len(), 19);
    assert_eq!(&date[2..3], "/");
    assert_eq!(&date[10..11], " ");
}

#[test]
fn test_metadata_overrides() {
    let data = roff! {
        "filedata" => { "filetype" => "surface", "creationDate" => "today" },
    };
    let read_back = from_slice(&to_vec(&data, Format::Ascii).unwrap()).unwrap();
    let filedata = read_back.get_tag("filedata").unwrap();
    assert_eq!(filedata.get_value("filetype"), Some(&Value::from("surface")));
    assert_eq!(filedata.get_value("creationDate"), Some(&Value::from("today")));
}

#[test]
fn test_version_cannot_change() {
    for data in [
        roff! { "version" => { "major" => -1 } },
        roff! { "version" => { "minor" => -1 } },
        roff! { "version" => { "patch" => 0 } },
        roff! { "filedata" => { "byteswaptest" => -1 } },
    ] {
        assert!(matches!(to_vec(&data, Format::Binary), Err(Error::Write(_))));
    }
}

#[test]
fn test_just_one_eof() {
    let bytes = to_vec(&roff! { "eof" => {} }, Format::Binary).unwrap();
    let data = from_slice(&bytes).unwrap();
    assert_eq!(data.get("eof").map(OneOrMany::len), Some(1));
    assert!(data.get_tag("eof").unwrap().is_empty());
}

#[test]
fn test_repeated_tags_collapse() {
    let pairs = vec![("tagname", vec![("keyname", 1.0)]), ("tagname", vec![("keyname", 2.0)])];
    let data = strip_metadata(from_slice(&to_vec(&pairs, Format::Binary).unwrap()).unwrap());
    match data.get("tagname") {
        Some(OneOrMany::Many(tags)) => {
            let values: Vec<_> = tags.iter().map(|t| t.get_value("keyname").cloned()).collect();
            assert_eq!(
                values,
                vec![Some(Value::Double(1.0)), Some(Value::Double(2.0))]
            );
        }
        other => panic!("expected two tags, got {:?}", other),
    }
}

#[test]
fn test_read_result_writes_back() {
    let original = roff! {
        "t" => { "x" => 1, "x" => 2, "s" => "a" },
        "t" => { "y" => vec![1.5f32] },
    };
    let first = from_slice(&to_vec(&original, Format::Binary).unwrap()).unwrap();
    let second = from_slice(&to_vec(&first, Format::Ascii).unwrap()).unwrap();
    assert_eq!(strip_metadata(first), strip_metadata(second.clone()));
    assert_eq!(strip_metadata(second), original);
}

#[test]
fn test_empty_arrays() {
    let data = roff! {
        "t" => {
            "untyped" => Vec::<u8>::new(),
            "ints" => Array::Int(Vec::new()),
            "names" => Array::Char(Vec::new()),
        },
    };
    let text = String::from_utf8(to_vec(&data, Format::Ascii).unwrap()).unwrap();
    assert!(text.contains("array byte untyped 0\narray int ints 0\narray char names 0\n"));
    let read_back = from_slice(text.as_bytes()).unwrap();
    let tag = read_back.get_tag("t").unwrap();
    assert_eq!(tag.get_value("ints"), Some(&Value::Array(Array::Int(Vec::new()))));
}

#[test]
fn test_big_endian_file() {
    let options = WriteOptions::new().with_endianness(Endianness::Big);
    let bytes = to_vec_with_options(&grid(), &options).unwrap();
    let data = from_slice(&bytes).unwrap();
    assert_eq!(
        data.get_tag("dimensions").unwrap().get_value("nX"),
        Some(&Value::Int(2))
    );
    let corners = data.get_tag("cornerLines").unwrap().get_value("data").unwrap();
    assert_eq!(corners.as_array().map(Array::len), Some(36));
    assert_eq!(
        corners,
        &Value::Array(Array::Float((0..36).map(|i| i as f32 * 0.5).collect()))
    );
}

#[test]
fn test_byteswapped_handwritten_file() {
    let bytes = b"roff-bin\0\
        tag\0filedata\0int\0byteswaptest\0\0\0\0\x01endtag\0\
        tag\0t\0double\0d\0\x3f\xf0\0\0\0\0\0\0array\0int\0a\0\0\0\0\x02\0\0\0\x01\0\0\0\x02endtag\0\
        tag\0eof\0endtag\0";
    let data = from_slice(bytes).unwrap();
    let tag = data.get_tag("t").unwrap();
    assert_eq!(tag.get_value("d"), Some(&Value::Double(1.0)));
    assert_eq!(tag.get_value("a"), Some(&Value::from(vec![1, 2])));
}

#[test]
fn test_wrong_file_mode() {
    let binary = to_vec(&roff! {}, Format::Binary).unwrap();
    let ascii = to_vec(&roff! {}, Format::Ascii).unwrap();
    let text_mode = ReadOptions::new().with_mode(FileMode::Text);
    let binary_mode = ReadOptions::new().with_mode(FileMode::Binary);
    assert!(matches!(
        read_with_options(Cursor::new(&binary), &text_mode),
        Err(Error::WrongFileMode(_))
    ));
    assert!(matches!(
        read_with_options(Cursor::new(&ascii), &binary_mode),
        Err(Error::WrongFileMode(_))
    ));
    assert!(read_with_options(Cursor::new(&ascii), &text_mode).is_ok());
    assert!(read_with_options(Cursor::new(&binary), &binary_mode).is_ok());
}

#[test]
fn test_stream_is_read_from_current_position() {
    let mut stream = Cursor::new(Vec::new());
    stream.write_all(b"prefix").unwrap();
    write(&mut stream, &roff! { "t" => { "x" => 5 } }, Format::Ascii).unwrap();
    stream.seek(SeekFrom::Start(6)).unwrap();
    let data = read(stream).unwrap();
    assert_eq!(data.get_tag("t").unwrap().get_value("x"), Some(&Value::Int(5)));
}

#[test]
fn test_missing_filedata_warning() {
    let mut reader = lazy_read(Cursor::new(b"roff-bin\0tag\0t\0int\0x\0\x01\0\0\0endtag\0")).unwrap();
    let data = reader.read_to_end().unwrap();
    assert_eq!(data.get_tag("t").unwrap().get_value("x"), Some(&Value::Int(1)));
    assert!(matches!(
        reader.warnings(),
        [Warning::MissingFiledata { endianness: Endianness::Little }]
    ));
}

#[test]
fn test_cast_warnings_from_json() {
    let json = serde_json::json!({ "t": { "big": 7, "small": -3, "frac": 0.25 } });
    let mut writer = RoffWriter::new(WriteOptions::ascii());
    let text = String::from_utf8(writer.to_vec(&json).unwrap()).unwrap();
    // serde_json orders object keys
    assert!(text.contains("int big 7\ndouble frac 0.25\nint small -3\n"));
    assert!(!writer.warnings().is_empty());
    assert!(writer
        .warnings()
        .iter()
        .all(|w| matches!(w, Warning::Cast { to: roffio::ElementType::Int, .. })));
}

#[test]
fn test_json_overflow_is_an_error() {
    let json = serde_json::json!({ "t": { "huge": 1u64 << 40 } });
    assert!(matches!(to_vec(&json, Format::Binary), Err(Error::Write(_))));
}

#[test]
fn test_invalid_ascii_names() {
    let mut tags = BTreeMap::new();
    tags.insert("bad name", BTreeMap::from([("x", 1)]));
    assert!(matches!(to_vec(&tags, Format::Ascii), Err(Error::Write(_))));
    // the same name is fine in binary
    assert!(to_vec(&tags, Format::Binary).is_ok());
}

#[test]
fn test_binary_names_cannot_start_with_comment_marker() {
    assert!(matches!(
        to_vec(&roff! { "#a#" => { "x" => 1 } }, Format::Binary),
        Err(Error::Write(_))
    ));
    assert!(matches!(
        to_vec(&roff! { "t" => { "#k#" => 1 } }, Format::Binary),
        Err(Error::Write(_))
    ));
    // only a leading '#' opens a comment
    let data = roff! { "a#b" => { "k#" => 1 } };
    let read_back = from_slice(&to_vec(&data, Format::Binary).unwrap()).unwrap();
    assert_eq!(
        read_back.get_tag("a#b").unwrap().get_value("k#"),
        Some(&Value::Int(1))
    );
    // char values are unaffected
    let data = roff! { "t" => { "s" => "#a#", "names" => vec!["#a#", "b"] } };
    let read_back = from_slice(&to_vec(&data, Format::Binary).unwrap()).unwrap();
    assert_eq!(
        read_back.get_tag("t").unwrap().get_value("s"),
        Some(&Value::from("#a#"))
    );
}

#[test]
fn test_syntax_errors() {
    assert!(matches!(
        from_slice(b"roff-asc tag t int x 1"),
        Err(Error::Syntax { .. }) | Err(Error::Tokenization { .. })
    ));
    assert!(matches!(
        from_slice(b"roff-asc tag t bool b 2 endtag"),
        Err(Error::Type { .. })
    ));
    assert!(matches!(
        from_slice(b"roff-asc tag t int x \"a\" endtag"),
        Err(Error::Type { .. })
    ));
    assert!(matches!(
        from_slice(b"roff-asc tag t int x 1.5.5 endtag"),
        Err(Error::Syntax { .. })
    ));
}

#[test]
fn test_paths() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grid.roff");
    write_path(&path, &grid(), Format::Binary).unwrap();

    let data = read_path(&path).unwrap();
    assert!(data.contains_key("cornerLines"));

    let mut reader = lazy_read_path(&path).unwrap();
    let mut names = Vec::new();
    while let Some(tag) = reader.next_tag().unwrap() {
        names.push(tag.name().to_string());
    }
    assert_eq!(
        names,
        vec!["filedata", "version", "dimensions", "cornerLines", "active", "eof"]
    );
}

#[test]
fn test_failed_write_path_creates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.roff");
    let data = vec![("t", vec![("x", vec![vec![1]])])];
    assert!(write_path(&path, &data, Format::Binary).is_err());
    assert!(!path.exists());
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        read_path(dir.path().join("missing.roff")),
        Err(Error::Io(_))
    ));
}
