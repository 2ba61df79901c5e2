/// Builds a [`RoffData`](crate::RoffData) from tag and key literals.
///
/// Values go through [`Value::from`](crate::Value), so an integer literal becomes an
/// `int`, a float literal a `double`, and a `Vec` an array of the matching type.
/// Repeated tag or key names are kept, in order.
///
/// # Examples
///
/// ```rust
/// use roffio::{roff, Value};
///
/// let data = roff! {
///     "dimensions" => { "nX" => 2, "nY" => 3, "nZ" => 1 },
///     "zvalues" => { "data" => vec![0.5f32; 6] },
/// };
///
/// let dimensions = data.get_tag("dimensions").unwrap();
/// assert_eq!(dimensions.get_value("nY"), Some(&Value::Int(3)));
/// ```
#[macro_export]
macro_rules! roff {
    ($($tag:expr => { $($key:expr => $value:expr),* $(,)? }),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut data = $crate::RoffData::new();
        $(
            #[allow(unused_mut)]
            let mut tag = $crate::TagMap::new();
            $(
                tag.push($key, $crate::Value::from($value));
            )*
            data.push($tag, tag);
        )*
        data
    }};
}

#[cfg(test)]
mod tests {
    use crate::{Array, OneOrMany, RoffData, Value};

    #[test]
    fn test_roff_macro_empty() {
        assert_eq!(roff! {}, RoffData::new());
        let data = roff! { "eof" => {} };
        assert!(data.get_tag("eof").unwrap().is_empty());
    }

    #[test]
    fn test_roff_macro_values() {
        let data = roff! {
            "t" => {
                "flag" => true,
                "count" => 3,
                "scale" => 1.5,
                "name" => "grid",
                "data" => vec![1u8, 2],
            },
        };
        let tag = data.get_tag("t").unwrap();
        assert_eq!(tag.get_value("flag"), Some(&Value::Bool(true)));
        assert_eq!(tag.get_value("count"), Some(&Value::Int(3)));
        assert_eq!(tag.get_value("scale"), Some(&Value::Double(1.5)));
        assert_eq!(tag.get_value("name"), Some(&Value::Char("grid".to_string())));
        assert_eq!(
            tag.get_value("data"),
            Some(&Value::Array(Array::Bytes(vec![1, 2])))
        );
    }

    #[test]
    fn test_roff_macro_repeats() {
        let data = roff! { "t" => { "x" => 1 }, "t" => { "x" => 2, "x" => 3 } };
        match data.get("t") {
            Some(OneOrMany::Many(tags)) => {
                assert_eq!(tags.len(), 2);
                assert_eq!(tags[1].get("x").map(OneOrMany::len), Some(2));
            }
            other => panic!("expected repeated tag, got {:?}", other),
        }
    }
}
