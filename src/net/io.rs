//! I/O 支持：JSON 与 RON 序列化接口。网在读入后会重新校验。
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use ron::ser::PrettyConfig;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::net::builder::{DenseNet, MarkingPolicy};
use crate::net::core::{Net, NetError};

#[derive(Debug, Error)]
pub enum IoError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("ron error: {0}")]
    Ron(#[from] ron::Error),
    #[error("ron error: {0}")]
    RonSpanned(#[from] ron::error::SpannedError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Net(#[from] NetError),
}

pub fn to_json_string<T>(value: &T) -> Result<String, IoError>
where
    T: Serialize,
{
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn from_json_str<T>(s: &str) -> Result<T, IoError>
where
    T: DeserializeOwned,
{
    Ok(serde_json::from_str(s)?)
}

pub fn write_json<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<(), IoError> {
    let mut file = File::create(path)?;
    let content = to_json_string(value)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

pub fn read_json<P: AsRef<Path>, T: DeserializeOwned>(path: P) -> Result<T, IoError> {
    from_json_str(&read_to_string(path)?)
}

pub fn to_ron_string<T>(value: &T) -> Result<String, IoError>
where
    T: Serialize,
{
    let mut pretty = PrettyConfig::default();
    pretty.new_line = "\n".into();
    Ok(ron::ser::to_string_pretty(value, pretty)?)
}

pub fn from_ron_str<T>(s: &str) -> Result<T, IoError>
where
    T: DeserializeOwned,
{
    Ok(ron::from_str(s)?)
}

pub fn write_ron<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<(), IoError> {
    let mut file = File::create(path)?;
    let content = to_ron_string(value)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

pub fn read_ron<P: AsRef<Path>, T: DeserializeOwned>(path: P) -> Result<T, IoError> {
    from_ron_str(&read_to_string(path)?)
}

fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String, IoError> {
    let mut file = File::open(path)?;
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(content)
}

/// Reads a serialized [`Net`] and checks it again, since the file may have been edited by hand.
pub fn net_from_json_str(s: &str) -> Result<Net, IoError> {
    let net: Net = from_json_str(s)?;
    net.validate()?;
    Ok(net)
}

pub fn net_from_ron_str(s: &str) -> Result<Net, IoError> {
    let net: Net = from_ron_str(s)?;
    net.validate()?;
    Ok(net)
}

/// Reads a [`DenseNet`] description from JSON.
pub fn dense_from_json_str(s: &str, policy: MarkingPolicy) -> Result<Net, IoError> {
    let dense: DenseNet = from_json_str(s)?;
    Ok(dense.into_net(policy)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::{Marking, PlaceId, TransitionId};

    const DENSE: &str = r#"{
        "places": ["a", "b"],
        "transitions": ["go", "back"],
        "input":  [[1, 0], [0, 1]],
        "output": [[0, 1], [1, 0]],
        "orientation": "place_major",
        "initial": [1]
    }"#;

    #[test]
    fn dense_json_is_normalized() {
        let net = dense_from_json_str(DENSE, MarkingPolicy::Normalize).unwrap();
        assert_eq!(net.initial_marking(), Marking::from(vec![1, 0]));
        assert_eq!(net.input_weight(PlaceId::new(1), TransitionId::new(1)), 1);
        assert!(matches!(
            dense_from_json_str(DENSE, MarkingPolicy::Strict),
            Err(IoError::Net(NetError::MarkingLength { .. }))
        ));
    }

    #[test]
    fn serialized_net_reads_back() {
        let net = dense_from_json_str(DENSE, MarkingPolicy::Normalize).unwrap();
        let json = to_json_string(&net).unwrap();
        let back = net_from_json_str(&json).unwrap();
        assert_eq!(back.arcs().collect::<Vec<_>>(), net.arcs().collect::<Vec<_>>());

        let ron = to_ron_string(&net).unwrap();
        let back = net_from_ron_str(&ron).unwrap();
        assert_eq!(back.initial_marking(), net.initial_marking());
    }

    #[test]
    fn bad_ron_is_an_error_not_a_panic() {
        assert!(matches!(from_ron_str::<Net>("(places: ["), Err(IoError::RonSpanned(_))));
    }
}
