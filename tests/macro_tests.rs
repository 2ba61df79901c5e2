use roffio::{from_slice, roff, to_vec, Array, Format, OneOrMany, RoffData, TagMap, Value};

#[test]
fn test_roff_macro_matches_manual_construction() {
    let from_macro = roff! {
        "dimensions" => { "nX" => 2, "nY" => 3 },
        "active" => { "data" => vec![true, false] },
    };

    let mut manual = RoffData::new();
    let mut dimensions = TagMap::new();
    dimensions.push("nX", Value::Int(2));
    dimensions.push("nY", Value::Int(3));
    manual.push("dimensions", dimensions);
    let mut active = TagMap::new();
    active.push("data", Value::Array(Array::Bool(vec![true, false])));
    manual.push("active", active);

    assert_eq!(from_macro, manual);
}

#[test]
fn test_roff_macro_trailing_commas() {
    let data = roff! {
        "a" => { "x" => 1, },
        "b" => {},
    };
    assert_eq!(data.len(), 2);
}

#[test]
fn test_roff_macro_expressions() {
    let name = String::from("subgrid");
    let layers = vec![1, 2, 3];
    let data = roff! { name.as_str() => { "nLayers" => layers.clone(), "label" => name.clone() } };
    let tag = data.get_tag("subgrid").unwrap();
    assert_eq!(tag.get_value("nLayers"), Some(&Value::from(layers)));
    assert_eq!(tag.get_value("label"), Some(&Value::from("subgrid")));
}

#[test]
fn test_roff_macro_written_and_read() {
    let data = roff! {
        "t" => { "x" => 1, "x" => 2 },
    };
    let read_back = from_slice(&to_vec(&data, Format::Ascii).unwrap()).unwrap();
    assert_eq!(
        read_back.get_tag("t").unwrap().get("x"),
        Some(&OneOrMany::Many(vec![Value::Int(1), Value::Int(2)]))
    );
}
