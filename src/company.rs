// src/company.rs
//! Company records as they come out of ingestion, plus the small display
//! helpers the directory UI needs (tag splitting, social platform, buckets).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Founder {
    pub name: String,
    #[serde(default)]
    pub linkedin: String, // may be empty
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub name: String,
    pub website: String,
    pub description: String,
    /// Comma-separated tag list, kept exactly as ingested.
    pub industry: String,
    pub founders: Vec<Founder>,
    /// Founding year as text; blank or malformed values are kept verbatim.
    pub founded: String,
    pub team_size: u32,
    pub location: String,
    pub socials: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>, // originating file, debugging only
}

impl Company {
    /// Lowercase `name|website`, the identity used for deduplication.
    pub fn dedup_key(&self) -> String {
        format!("{}|{}", self.name, self.website).to_lowercase()
    }

    /// Split, trimmed, non-empty industry tags.
    pub fn industry_tags(&self) -> impl Iterator<Item = &str> {
        split_tags(&self.industry)
    }

    /// `founded` as a year for "latest" ordering; anything unparseable is 0.
    pub fn founded_year(&self) -> i64 {
        self.founded.trim().parse::<i64>().unwrap_or(0)
    }

    pub fn website_display(&self) -> &str {
        let w = self.website.as_str();
        w.strip_prefix("https://")
            .or_else(|| w.strip_prefix("http://"))
            .unwrap_or(w)
    }

    pub fn social_platform(&self) -> Option<SocialPlatform> {
        SocialPlatform::from_url(&self.socials)
    }

    pub fn team_size_bucket(&self) -> Option<TeamSizeBucket> {
        TeamSizeBucket::of(self.team_size)
    }
}

pub(crate) fn split_tags(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|t| !t.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SocialPlatform {
    LinkedIn,
    X,
    Other,
}

impl SocialPlatform {
    /// Substring sniffing only; the URL itself is never validated.
    pub fn from_url(url: &str) -> Option<Self> {
        let u = url.trim().to_ascii_lowercase();
        if u.is_empty() {
            return None;
        }
        if u.contains("linkedin.com") {
            Some(Self::LinkedIn)
        } else if u.contains("twitter.com") || u.contains("x.com") {
            Some(Self::X)
        } else {
            Some(Self::Other)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TeamSizeBucket {
    #[serde(rename = "1-10")]
    Small,
    #[serde(rename = "11-50")]
    Medium,
    #[serde(rename = "51+")]
    Large,
}

impl TeamSizeBucket {
    pub const ALL: [TeamSizeBucket; 3] = [Self::Small, Self::Medium, Self::Large];

    pub fn of(team_size: u32) -> Option<Self> {
        match team_size {
            0 => None,
            1..=10 => Some(Self::Small),
            11..=50 => Some(Self::Medium),
            _ => Some(Self::Large),
        }
    }

    pub fn contains(self, team_size: u32) -> bool {
        Self::of(team_size) == Some(self)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Small => "1-10",
            Self::Medium => "11-50",
            Self::Large => "51+",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.label() == label.trim())
    }
}

impl std::fmt::Display for TeamSizeBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn company(name: &str, website: &str) -> Company {
        Company {
            name: name.into(),
            website: website.into(),
            ..Default::default()
        }
    }

    #[test]
    fn dedup_key_is_case_insensitive() {
        let a = company("Acme", "https://A.co");
        let b = company("ACME", "https://a.CO");
        assert_eq!(a.dedup_key(), b.dedup_key());
        assert_eq!(a.dedup_key(), "acme|https://a.co");
    }

    #[test]
    fn industry_tags_are_trimmed_and_skip_blanks() {
        let mut c = company("X", "x.io");
        c.industry = " ai , saas,, b2b ".into();
        let tags: Vec<&str> = c.industry_tags().collect();
        assert_eq!(tags, vec!["ai", "saas", "b2b"]);
    }

    #[test]
    fn founded_year_falls_back_to_zero() {
        let mut c = company("X", "x.io");
        c.founded = " 2022 ".into();
        assert_eq!(c.founded_year(), 2022);
        c.founded = "".into();
        assert_eq!(c.founded_year(), 0);
        c.founded = "circa 2019".into();
        assert_eq!(c.founded_year(), 0);
        c.founded = "2019 (est.)".into();
        assert_eq!(c.founded_year(), 0);
    }

    #[test]
    fn bucket_boundaries() {
        assert_eq!(TeamSizeBucket::of(0), None);
        assert_eq!(TeamSizeBucket::of(1), Some(TeamSizeBucket::Small));
        assert_eq!(TeamSizeBucket::of(10), Some(TeamSizeBucket::Small));
        assert_eq!(TeamSizeBucket::of(11), Some(TeamSizeBucket::Medium));
        assert_eq!(TeamSizeBucket::of(50), Some(TeamSizeBucket::Medium));
        assert_eq!(TeamSizeBucket::of(51), Some(TeamSizeBucket::Large));
        assert_eq!(TeamSizeBucket::parse(" 51+ "), Some(TeamSizeBucket::Large));
        assert_eq!(TeamSizeBucket::parse("100+"), None);
    }

    #[test]
    fn social_platform_by_substring() {
        assert_eq!(
            SocialPlatform::from_url("https://www.linkedin.com/company/acme"),
            Some(SocialPlatform::LinkedIn)
        );
        assert_eq!(
            SocialPlatform::from_url("https://twitter.com/acme"),
            Some(SocialPlatform::X)
        );
        assert_eq!(SocialPlatform::from_url("https://x.com/acme"), Some(SocialPlatform::X));
        assert_eq!(
            SocialPlatform::from_url("https://github.com/acme"),
            Some(SocialPlatform::Other)
        );
        assert_eq!(SocialPlatform::from_url("  "), None);
    }

    #[test]
    fn website_display_strips_scheme() {
        assert_eq!(company("A", "https://a.co").website_display(), "a.co");
        assert_eq!(company("A", "http://a.co").website_display(), "a.co");
        assert_eq!(company("A", "a.co").website_display(), "a.co");
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let mut c = company("Acme", "a.co");
        c.team_size = 5;
        let v = serde_json::to_value(&c).unwrap();
        assert_eq!(v["teamSize"], 5);
        assert!(v.get("source").is_none());
    }
}
