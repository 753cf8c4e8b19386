//! Serde helpers for human-readable durations in configuration.

/// `Duration` fields written as `"10s"`/`"1m30s"` or as whole seconds
pub mod duration {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Written {
        Seconds(i64),
        Text(String),
    }

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&humantime::format_duration(*duration))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Written::deserialize(deserializer)
            .map_err(|_| <D::Error as de::Error>::custom("timeout must be whole seconds or a humantime string such as \"10s\""))?
        {
            Written::Seconds(seconds) => u64::try_from(seconds)
                .map(Duration::from_secs)
                .map_err(|_| de::Error::custom(format!("timeout of {seconds}s is negative"))),
            Written::Text(text) => humantime::parse_duration(&text)
                .map_err(|e| de::Error::custom(format!("cannot read '{text}' as a duration: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Timeouts {
        #[serde(with = "super::duration")]
        connect: Duration,
    }

    #[test]
    fn test_human_readable_and_numeric() {
        let parsed: Timeouts = toml::from_str("connect = \"1m30s\"").unwrap();
        assert_eq!(parsed.connect, Duration::from_secs(90));

        let parsed: Timeouts = toml::from_str("connect = 15").unwrap();
        assert_eq!(parsed.connect, Duration::from_secs(15));

        let err = toml::from_str::<Timeouts>("connect = -5").unwrap_err();
        assert!(err.to_string().contains("negative"));
        let err = toml::from_str::<Timeouts>("connect = \"soon\"").unwrap_err();
        assert!(err.to_string().contains("cannot read 'soon'"));
        assert!(toml::from_str::<Timeouts>("connect = true").is_err());
    }

    #[test]
    fn test_serializes_as_string() {
        let text = toml::to_string(&Timeouts {
            connect: Duration::from_secs(10),
        })
        .unwrap();
        assert_eq!(text.trim(), "connect = \"10s\"");
    }
}
