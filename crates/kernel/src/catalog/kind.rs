//! Page kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every page type the site knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PageKind {
    #[serde(rename = "pages.HomePage")]
    HomePage,
    #[serde(rename = "pages.HigherEducation")]
    HigherEducation,
    #[serde(rename = "pages.ContactUs")]
    ContactUs,
    #[serde(rename = "pages.AboutUs")]
    AboutUs,
    #[serde(rename = "pages.GeneralPage")]
    GeneralPage,
    #[serde(rename = "pages.EcosystemAllies")]
    EcosystemAllies,
    #[serde(rename = "pages.FoundationSupport")]
    FoundationSupport,
    #[serde(rename = "pages.OurImpact")]
    OurImpact,
    #[serde(rename = "pages.Give")]
    Give,
    #[serde(rename = "pages.TermsOfService")]
    TermsOfService,
    #[serde(rename = "pages.AP")]
    Ap,
    #[serde(rename = "pages.FAQ")]
    Faq,
    #[serde(rename = "pages.Support")]
    Support,
    #[serde(rename = "pages.GiveForm")]
    GiveForm,
    #[serde(rename = "pages.Accessibility")]
    Accessibility,
    #[serde(rename = "pages.Licensing")]
    Licensing,
    #[serde(rename = "pages.CompCopy")]
    CompCopy,
    #[serde(rename = "pages.AdoptForm")]
    AdoptForm,
    #[serde(rename = "pages.InterestForm")]
    InterestForm,
    #[serde(rename = "pages.Marketing")]
    Marketing,
    #[serde(rename = "pages.Technology")]
    Technology,
    #[serde(rename = "books.BookIndex")]
    BookIndex,
    #[serde(rename = "books.Book")]
    Book,
    #[serde(rename = "allies.Ally")]
    Ally,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown page type '{0}'")]
pub struct UnknownPageKind(pub String);

impl PageKind {
    pub const ALL: [PageKind; 24] = [
        PageKind::HomePage,
        PageKind::HigherEducation,
        PageKind::ContactUs,
        PageKind::AboutUs,
        PageKind::GeneralPage,
        PageKind::EcosystemAllies,
        PageKind::FoundationSupport,
        PageKind::OurImpact,
        PageKind::Give,
        PageKind::TermsOfService,
        PageKind::Ap,
        PageKind::Faq,
        PageKind::Support,
        PageKind::GiveForm,
        PageKind::Accessibility,
        PageKind::Licensing,
        PageKind::CompCopy,
        PageKind::AdoptForm,
        PageKind::InterestForm,
        PageKind::Marketing,
        PageKind::Technology,
        PageKind::BookIndex,
        PageKind::Book,
        PageKind::Ally,
    ];

    /// Qualified type name, e.g. `books.Book`.
    pub fn as_str(self) -> &'static str {
        match self {
            PageKind::HomePage => "pages.HomePage",
            PageKind::HigherEducation => "pages.HigherEducation",
            PageKind::ContactUs => "pages.ContactUs",
            PageKind::AboutUs => "pages.AboutUs",
            PageKind::GeneralPage => "pages.GeneralPage",
            PageKind::EcosystemAllies => "pages.EcosystemAllies",
            PageKind::FoundationSupport => "pages.FoundationSupport",
            PageKind::OurImpact => "pages.OurImpact",
            PageKind::Give => "pages.Give",
            PageKind::TermsOfService => "pages.TermsOfService",
            PageKind::Ap => "pages.AP",
            PageKind::Faq => "pages.FAQ",
            PageKind::Support => "pages.Support",
            PageKind::GiveForm => "pages.GiveForm",
            PageKind::Accessibility => "pages.Accessibility",
            PageKind::Licensing => "pages.Licensing",
            PageKind::CompCopy => "pages.CompCopy",
            PageKind::AdoptForm => "pages.AdoptForm",
            PageKind::InterestForm => "pages.InterestForm",
            PageKind::Marketing => "pages.Marketing",
            PageKind::Technology => "pages.Technology",
            PageKind::BookIndex => "books.BookIndex",
            PageKind::Book => "books.Book",
            PageKind::Ally => "allies.Ally",
        }
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageKind {
    type Err = UnknownPageKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PageKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownPageKind(s.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for kind in PageKind::ALL {
            assert_eq!(kind.as_str().parse::<PageKind>().unwrap(), kind);
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, serde_json::Value::String(kind.to_string()));
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("books.book".parse::<PageKind>().unwrap(), PageKind::Book);
        assert!("pages.Blog".parse::<PageKind>().is_err());
    }
}
