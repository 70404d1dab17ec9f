//! The reader session: credentials needed to request page images.

use std::collections::HashMap;

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, TimeZone, Utc};
use url::Url;

use crate::error::{Error, Result};

/// Reader page input ids (and `urlrights` keys) a session is built from.
pub mod field {
    pub const FILE_ID: &str = "txtFileID";
    pub const META_ID: &str = "txtMetaId";
    pub const ORG_IDENTIFIER: &str = "txtOrgIdentifier";
    pub const SESSION_ID: &str = "txtSessionId";
    pub const USER_NAME: &str = "txtuserName";
    pub const CULTURE_NAME: &str = "txtCultureName";
    pub const BOOK_NAME: &str = "txtBookName";
    pub const CREATOR: &str = "txtCreator";
    pub const URL_RIGHTS: &str = "urlrights";
    pub const RIGHTS: &str = "rights";
    pub const TIME: &str = "time";
    pub const SIGN: &str = "sign";
}

/// Content listing endpoint, relative to the reader page.
const CONTENT_ENDPOINT: &str = "Command/Getcontent.ashx";

/// Page image endpoint, relative to the reader page.
const IMAGE_ENDPOINT: &str = "command/imagepage.ashx";

/// Requested width/height; large enough that the server answers with its maximum resolution.
const FULL_RESOLUTION: &str = "9999";

/// Calendar layouts the `time` field has been observed in.
const DEADLINE_FORMATS: &[&str] = &["%Y%m%d%H%M%S", "%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M:%S"];

/// Authenticated, time-bounded credentials for one reader session.
///
/// Built in one step from the reader page fields; there are no setters, a
/// session that runs out is replaced by a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    file_id: String,
    meta_id: String,
    org_identifier: String,
    session_id: String,
    user_name: String,
    culture_name: String,
    rights: String,
    time: String,
    sign: String,
    deadline: DateTime<Utc>,
    book_name: Option<String>,
    creator: Option<String>,
    reader_url: Url,
}

impl Session {
    /// Project the merged reader fields into a session.
    ///
    /// Every credential field must be present; `deadline_offset` is the zone
    /// calendar-style `time` values are written in.
    pub fn from_fields(
        fields: &HashMap<String, String>,
        reader_url: Url,
        deadline_offset: FixedOffset,
    ) -> Result<Self> {
        let require = |name: &str| -> Result<String> {
            fields
                .get(name)
                .cloned()
                .ok_or_else(|| Error::missing_field(name, "reader page"))
        };
        let optional = |name: &str| -> Option<String> {
            fields
                .get(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let time = require(field::TIME)?;
        let deadline = parse_deadline(&time, deadline_offset)?;

        Ok(Self {
            file_id: require(field::FILE_ID)?,
            meta_id: require(field::META_ID)?,
            org_identifier: require(field::ORG_IDENTIFIER)?,
            session_id: require(field::SESSION_ID)?,
            user_name: require(field::USER_NAME)?,
            culture_name: require(field::CULTURE_NAME)?,
            rights: require(field::RIGHTS)?,
            sign: require(field::SIGN)?,
            time,
            deadline,
            book_name: optional(field::BOOK_NAME),
            creator: optional(field::CREATOR),
            reader_url,
        })
    }

    pub fn file_id(&self) -> &str {
        &self.file_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    pub fn book_name(&self) -> Option<&str> {
        self.book_name.as_deref()
    }

    pub fn creator(&self) -> Option<&str> {
        self.creator.as_deref()
    }

    pub fn reader_url(&self) -> &Url {
        &self.reader_url
    }

    /// Time left before the deadline (negative once past).
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        self.deadline - now
    }

    /// A session is fresh while strictly more than `margin` remains.
    pub fn is_fresh_at(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        self.remaining(now) > margin
    }

    pub fn content_endpoint(&self) -> Result<Url> {
        Ok(self.reader_url.join(CONTENT_ENDPOINT)?)
    }

    pub fn image_endpoint(&self) -> Result<Url> {
        Ok(self.reader_url.join(IMAGE_ENDPOINT)?)
    }

    /// Query of the content listing request, in wire order.
    pub fn content_query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("OrgIdentifier", self.org_identifier.clone()),
            ("objID", self.file_id.clone()),
            ("parentIndex", "0".to_string()),
            ("ServiceType", "getcontent".to_string()),
            ("metaId", self.meta_id.clone()),
            ("OrgId", self.org_identifier.clone()),
            ("SessionId", self.session_id.clone()),
            ("cult", self.culture_name.clone()),
            ("UserName", self.user_name.clone()),
        ]
    }

    /// Query of a full-resolution page image request, in wire order.
    pub fn image_query(&self, page: u32) -> Vec<(&'static str, String)> {
        vec![
            ("objID", self.file_id.clone()),
            ("metaId", self.meta_id.clone()),
            ("OrgId", self.org_identifier.clone()),
            ("scale", "1".to_string()),
            ("width", FULL_RESOLUTION.to_string()),
            ("height", FULL_RESOLUTION.to_string()),
            ("pageid", page.to_string()),
            ("ServiceType", "Imagepage".to_string()),
            ("SessionId", self.session_id.clone()),
            ("UserName", self.user_name.clone()),
            ("cult", self.culture_name.clone()),
            ("rights", self.rights.clone()),
            ("time", self.time.clone()),
            ("sign", self.sign.clone()),
        ]
    }
}

/// Read the session deadline out of the `time` field.
///
/// Accepts Unix seconds, Unix milliseconds, or one of [`DEADLINE_FORMATS`]
/// interpreted at `offset`.
pub fn parse_deadline(raw: &str, offset: FixedOffset) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    let invalid = || Error::Parse(format!("Unrecognized session deadline '{}'", raw));

    if !raw.is_empty() && raw.len() != 14 && raw.chars().all(|c| c.is_ascii_digit()) {
        let value: i64 = raw.parse().map_err(|_| invalid())?;
        let parsed = match raw.len() {
            1..=10 => Utc.timestamp_opt(value, 0).single(),
            13 => DateTime::from_timestamp_millis(value),
            _ => None,
        };
        return parsed.ok_or_else(invalid);
    }

    DEADLINE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .and_then(|naive| offset.from_local_datetime(&naive).single())
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beijing() -> FixedOffset {
        FixedOffset::east_opt(8 * 3600).unwrap()
    }

    fn sample_fields(time: &str) -> HashMap<String, String> {
        [
            (field::FILE_ID, "F-1"),
            (field::META_ID, "m.20151015-ZCKM-902-0064"),
            (field::ORG_IDENTIFIER, "pku"),
            (field::SESSION_ID, "S-1"),
            (field::USER_NAME, "guest"),
            (field::CULTURE_NAME, "CN"),
            (field::RIGHTS, "1-0_00"),
            (field::TIME, time),
            (field::SIGN, "abc123"),
            (field::BOOK_NAME, "  计算机网络 "),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    fn reader_url() -> Url {
        Url::parse("http://example.com/Usp/reader/read.aspx?id=9").unwrap()
    }

    #[test]
    fn test_from_fields() {
        let session =
            Session::from_fields(&sample_fields("1700000000"), reader_url(), beijing()).unwrap();
        assert_eq!(session.file_id(), "F-1");
        assert_eq!(session.book_name(), Some("计算机网络"));
        assert_eq!(session.creator(), None);
        assert_eq!(session.deadline().timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_missing_field_is_rejected() {
        for required in [field::FILE_ID, field::SESSION_ID, field::SIGN, field::TIME] {
            let mut fields = sample_fields("1700000000");
            fields.remove(required);
            let err = Session::from_fields(&fields, reader_url(), beijing()).unwrap_err();
            match err {
                Error::MissingField { field, .. } => assert_eq!(field, required),
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn test_freshness_boundary() {
        let session =
            Session::from_fields(&sample_fields("1700000000"), reader_url(), beijing()).unwrap();
        let margin = Duration::seconds(30);
        let deadline = session.deadline();

        assert!(!session.is_fresh_at(deadline - Duration::seconds(30), margin));
        assert!(session.is_fresh_at(deadline - Duration::seconds(31), margin));
        assert!(!session.is_fresh_at(deadline, margin));
        assert!(!session.is_fresh_at(deadline + Duration::seconds(5), margin));
    }

    #[test]
    fn test_parse_deadline_forms() {
        let expected = Utc.with_ymd_and_hms(2015, 10, 15, 4, 0, 0).unwrap();
        assert_eq!(parse_deadline("20151015120000", beijing()).unwrap(), expected);
        assert_eq!(parse_deadline("2015-10-15 12:00:00", beijing()).unwrap(), expected);
        assert_eq!(parse_deadline("2015/10/15 12:00:00", beijing()).unwrap(), expected);
        assert_eq!(
            parse_deadline(&expected.timestamp().to_string(), beijing()).unwrap(),
            expected
        );
        assert_eq!(
            parse_deadline(&expected.timestamp_millis().to_string(), beijing()).unwrap(),
            expected
        );
    }

    #[test]
    fn test_parse_deadline_invalid() {
        assert!(parse_deadline("", beijing()).is_err());
        assert!(parse_deadline("tomorrow", beijing()).is_err());
        assert!(parse_deadline("12345678901", beijing()).is_err());
    }

    #[test]
    fn test_wire_queries() {
        let session =
            Session::from_fields(&sample_fields("1700000000"), reader_url(), beijing()).unwrap();

        let keys: Vec<&str> = session.image_query(7).iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            [
                "objID", "metaId", "OrgId", "scale", "width", "height", "pageid", "ServiceType",
                "SessionId", "UserName", "cult", "rights", "time", "sign"
            ]
        );
        let image: HashMap<_, _> = session.image_query(7).into_iter().collect();
        assert_eq!(image["pageid"], "7");
        assert_eq!(image["width"], "9999");
        assert_eq!(image["time"], "1700000000");

        let content: HashMap<_, _> = session.content_query().into_iter().collect();
        assert_eq!(content["OrgIdentifier"], "pku");
        assert_eq!(content["OrgId"], "pku");
        assert_eq!(content["parentIndex"], "0");
        assert_eq!(content["ServiceType"], "getcontent");

        assert_eq!(
            session.image_endpoint().unwrap().as_str(),
            "http://example.com/Usp/reader/command/imagepage.ashx"
        );
        assert_eq!(
            session.content_endpoint().unwrap().as_str(),
            "http://example.com/Usp/reader/Command/Getcontent.ashx"
        );
    }
}
