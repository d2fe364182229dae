//! Creation-time decoding for Discord snowflake identifiers.

use chrono::{DateTime, Utc};

/// Milliseconds between the Unix epoch and the Discord epoch (2015-01-01T00:00:00Z).
const DISCORD_EPOCH_MS: u64 = 1_420_070_400_000;

/// Decode the creation timestamp embedded in a snowflake.
///
/// The top 42 bits of a snowflake are milliseconds since the Discord
/// epoch. `None` only occurs when the millisecond value falls outside
/// chrono's representable range, which no identifier issued by the
/// platform can reach; callers still handle it rather than substituting
/// a bogus timestamp.
pub fn message_timestamp(id: u64) -> Option<DateTime<Utc>> {
    let millis = (id >> 22) + DISCORD_EPOCH_MS;
    DateTime::from_timestamp_millis(millis as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_zero_id_decodes_to_discord_epoch() {
        let epoch = Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(message_timestamp(0), Some(epoch));
    }

    #[test]
    fn test_known_snowflake() {
        // 175928847299117063 is the documented example snowflake,
        // created 2016-04-30T11:18:25.796Z.
        let decoded = message_timestamp(175928847299117063).unwrap();
        assert_eq!(decoded.timestamp_millis(), 1_462_015_105_796);
    }

    #[test]
    fn test_decode_is_deterministic() {
        let id = 1_147_029_395_263_811_584;
        assert_eq!(message_timestamp(id), message_timestamp(id));
    }

    #[test]
    fn test_larger_id_never_decodes_earlier() {
        let ids = [
            0u64,
            1,
            1 << 21,
            1 << 22,
            175_928_847_299_117_063,
            1_147_029_395_263_811_584,
            u64::MAX,
        ];

        for window in ids.windows(2) {
            let earlier = message_timestamp(window[0]).unwrap();
            let later = message_timestamp(window[1]).unwrap();
            assert!(
                later >= earlier,
                "id {} decoded to {} which is before {} from id {}",
                window[1],
                later,
                earlier,
                window[0]
            );
        }
    }

    #[test]
    fn test_low_bits_do_not_change_timestamp() {
        // Worker/process/sequence bits sit below the timestamp.
        let base = 175_928_847_299_117_063u64 & !((1 << 22) - 1);
        assert_eq!(message_timestamp(base), message_timestamp(base + 4095));
    }
}
