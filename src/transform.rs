//! Value transformers attached to parameter rules. Each maps a caller
//! `Value` to the literal string the endpoint expects and rejects shapes
//! outside its domain.

use crate::crypto;
use crate::error::{Error, Result};
use crate::types::Value;

pub type TransformFn = fn(&Value) -> Result<String>;

/// `5` -> `[5]`, `[1,2,3]` -> `[1,2,3]`
pub fn json_array(value: &Value) -> Result<String> {
    match value {
        Value::Int(n) => Ok(format!("[{}]", n)),
        Value::IntSeq(_) => Ok(format!("[{}]", value)),
        Value::Text(_) => Err(unsupported(value)),
    }
}

/// `5` -> `["5"]`, `[1,2,3]` -> `["1,2,3"]`
pub fn json_array_quoted(value: &Value) -> Result<String> {
    match value {
        Value::Int(n) => Ok(format!("[\"{}\"]", n)),
        Value::IntSeq(_) => Ok(format!("[\"{}\"]", value)),
        Value::Text(_) => Err(unsupported(value)),
    }
}

/// Client platform code for the banner endpoint.
pub fn banner_type(value: &Value) -> Result<String> {
    let tag = match value {
        Value::Int(0) => "pc",
        Value::Int(1) => "android",
        Value::Int(2) => "iphone",
        Value::Int(3) => "ipad",
        _ => return Err(unsupported(value)),
    };
    Ok(tag.to_string())
}

/// Comment thread-id prefix for a resource type code.
pub fn comment_type(value: &Value) -> Result<String> {
    let tag = match value {
        Value::Int(0) => "R_SO_4_",  // song
        Value::Int(1) => "R_MV_5_",  // mv
        Value::Int(2) => "A_PL_0_",  // playlist
        Value::Int(3) => "R_AL_3_",  // album
        Value::Int(4) => "A_DJ_1_",  // radio
        Value::Int(5) => "R_VI_62_", // video
        Value::Int(6) => "A_EV_2_",  // moment
        _ => return Err(unsupported(value)),
    };
    Ok(tag.to_string())
}

/// Like `comment_type` but for the shareable-resource subset.
pub fn resource_type(value: &Value) -> Result<String> {
    let tag = match value {
        Value::Int(1) => "R_MV_5_",
        Value::Int(4) => "A_DJ_1_",
        Value::Int(5) => "R_VI_62_",
        Value::Int(6) => "A_EV_2_",
        _ => return Err(unsupported(value)),
    };
    Ok(tag.to_string())
}

pub fn dj_toplist_type(value: &Value) -> Result<String> {
    match value {
        Value::Text(s) if s == "new" => Ok("0".to_string()),
        Value::Text(s) if s == "hot" => Ok("1".to_string()),
        _ => Err(unsupported(value)),
    }
}

/// Uppercase char code of the first letter, used by the artist list filter.
pub fn artist_initial(value: &Value) -> Result<String> {
    match value {
        Value::Int(n) => Ok(n.to_string()),
        Value::Text(s) => match s.chars().next() {
            Some(c) => Ok((c.to_ascii_uppercase() as u32).to_string()),
            None => Err(unsupported(value)),
        },
        Value::IntSeq(_) => Err(unsupported(value)),
    }
}

/// Passwords travel as a lowercase-hex MD5 digest, never in the clear.
pub fn md5_hex(value: &Value) -> Result<String> {
    match value {
        Value::Text(s) => crypto::md5_hex(s.as_bytes()),
        _ => Err(unsupported(value)),
    }
}

/// Curated toplist index -> playlist id.
pub fn top_list_id(value: &Value) -> Result<String> {
    let id: i64 = match value {
        Value::Int(0) => 3779629,     // new songs
        Value::Int(1) => 3778678,     // hot songs
        Value::Int(2) => 2884035,     // originals
        Value::Int(3) => 19723756,    // surge
        Value::Int(4) => 10520166,    // electronic
        Value::Int(5) => 180106,      // uk weekly
        Value::Int(6) => 60198,       // billboard
        Value::Int(7) => 21845217,    // ktv
        Value::Int(8) => 11641012,    // itunes
        Value::Int(9) => 120001,      // hit fm
        Value::Int(10) => 60131,      // oricon
        Value::Int(11) => 3733003,    // melon weekly
        Value::Int(12) => 60255,      // mnet weekly
        Value::Int(13) => 46772709,   // melon ost
        Value::Int(14) => 112504,     // chinese top (hk/tw)
        Value::Int(15) => 64016,      // chinese top (mainland)
        Value::Int(16) => 10169002,   // rthk chinese chart
        Value::Int(17) => 4395559,    // golden melody
        Value::Int(18) => 1899724,    // chinese hip-hop
        Value::Int(19) => 27135204,   // nrj eurohot 30
        Value::Int(20) => 112463,     // hito chart
        Value::Int(21) => 3812895,    // beatport
        Value::Int(22) => 71385702,   // acg
        Value::Int(23) => 991319590,  // rap
        Value::Int(24) => 71384707,   // classical
        Value::Int(25) => 1978921795, // edm
        Value::Int(26) => 2250011882, // short video
        Value::Int(27) => 2617766278, // new voices
        Value::Int(28) => 745956260,  // korean
        Value::Int(29) => 2023401535, // q magazine
        Value::Int(30) => 2006508653, // esports
        Value::Int(31) => 2809513713, // western hot
        Value::Int(32) => 2809577409, // western new
        Value::Int(33) => 2847251561, // rap top
        Value::Int(34) => 3001835560, // acg anime
        Value::Int(35) => 3001795926, // acg game
        Value::Int(36) => 3001890046, // acg vocaloid
        _ => return Err(unsupported(value)),
    };
    Ok(id.to_string())
}

fn unsupported(value: &Value) -> Error {
    Error::UnsupportedValueType(format!("{:?}", value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_array() {
        assert_eq!(json_array(&Value::Int(5)).unwrap(), "[5]");
        assert_eq!(json_array(&Value::IntSeq(vec![1, 2, 3])).unwrap(), "[1,2,3]");
        assert!(matches!(
            json_array(&Value::Text("5".into())),
            Err(Error::UnsupportedValueType(_))
        ));
    }

    #[test]
    fn test_json_array_quoted() {
        assert_eq!(json_array_quoted(&Value::Int(5)).unwrap(), "[\"5\"]");
        assert_eq!(
            json_array_quoted(&Value::IntSeq(vec![1, 2])).unwrap(),
            "[\"1,2\"]"
        );
    }

    #[test]
    fn test_enum_code_transformers() {
        assert_eq!(banner_type(&Value::Int(0)).unwrap(), "pc");
        assert_eq!(banner_type(&Value::Int(2)).unwrap(), "iphone");
        assert!(banner_type(&Value::Int(9)).is_err());

        assert_eq!(comment_type(&Value::Int(0)).unwrap(), "R_SO_4_");
        assert_eq!(comment_type(&Value::Int(6)).unwrap(), "A_EV_2_");
        assert!(comment_type(&Value::Text("song".into())).is_err());

        assert_eq!(resource_type(&Value::Int(1)).unwrap(), "R_MV_5_");
        assert!(resource_type(&Value::Int(0)).is_err());

        assert_eq!(dj_toplist_type(&Value::Text("new".into())).unwrap(), "0");
        assert_eq!(dj_toplist_type(&Value::Text("hot".into())).unwrap(), "1");
        assert!(dj_toplist_type(&Value::Int(0)).is_err());
    }

    #[test]
    fn test_artist_initial() {
        assert_eq!(artist_initial(&Value::Text("b".into())).unwrap(), "66");
        assert_eq!(artist_initial(&Value::Text("B".into())).unwrap(), "66");
        assert_eq!(artist_initial(&Value::Int(-1)).unwrap(), "-1");
        assert!(artist_initial(&Value::Text("".into())).is_err());
    }

    #[test]
    fn test_md5_hex_password() {
        assert_eq!(
            md5_hex(&Value::Text("password".into())).unwrap(),
            "5f4dcc3b5aa765d61d8327deb882cf99"
        );
        assert!(md5_hex(&Value::Int(1)).is_err());
    }

    #[test]
    fn test_top_list_id() {
        assert_eq!(top_list_id(&Value::Int(0)).unwrap(), "3779629");
        assert_eq!(top_list_id(&Value::Int(36)).unwrap(), "3001890046");
        assert!(top_list_id(&Value::Int(37)).is_err());
    }
}
