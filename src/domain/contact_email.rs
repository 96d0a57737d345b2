use std::fmt::Display;
use validator::validate_email;

const INVALID_EMAIL: &str = "Please provide a valid email";

const GMAIL_DOMAINS: &[&str] = &["gmail.com", "googlemail.com"];
const ICLOUD_DOMAINS: &[&str] = &["icloud.com", "me.com"];
const YAHOO_DOMAINS: &[&str] = &[
    "rocketmail.com",
    "yahoo.ca",
    "yahoo.co.uk",
    "yahoo.com",
    "yahoo.de",
    "yahoo.fr",
    "yahoo.in",
    "yahoo.it",
    "ymail.com",
];
const YANDEX_DOMAINS: &[&str] = &[
    "yandex.ru",
    "yandex.ua",
    "yandex.kz",
    "yandex.com",
    "yandex.by",
    "ya.ru",
];
const OUTLOOK_DOMAINS: &[&str] = &[
    "hotmail.at",
    "hotmail.be",
    "hotmail.ca",
    "hotmail.cl",
    "hotmail.co.il",
    "hotmail.co.nz",
    "hotmail.co.th",
    "hotmail.co.uk",
    "hotmail.com",
    "hotmail.com.ar",
    "hotmail.com.au",
    "hotmail.com.br",
    "hotmail.com.gr",
    "hotmail.com.mx",
    "hotmail.com.pe",
    "hotmail.com.tr",
    "hotmail.com.vn",
    "hotmail.cz",
    "hotmail.de",
    "hotmail.dk",
    "hotmail.es",
    "hotmail.fr",
    "hotmail.hu",
    "hotmail.id",
    "hotmail.ie",
    "hotmail.in",
    "hotmail.it",
    "hotmail.jp",
    "hotmail.kr",
    "hotmail.lv",
    "hotmail.my",
    "hotmail.ph",
    "hotmail.pt",
    "hotmail.sa",
    "hotmail.sg",
    "hotmail.sk",
    "live.be",
    "live.co.uk",
    "live.com",
    "live.com.ar",
    "live.com.mx",
    "live.de",
    "live.es",
    "live.eu",
    "live.fr",
    "live.it",
    "live.nl",
    "msn.com",
    "outlook.at",
    "outlook.be",
    "outlook.cl",
    "outlook.co.il",
    "outlook.co.nz",
    "outlook.co.th",
    "outlook.com",
    "outlook.com.ar",
    "outlook.com.au",
    "outlook.com.br",
    "outlook.com.gr",
    "outlook.com.pe",
    "outlook.com.tr",
    "outlook.com.vn",
    "outlook.cz",
    "outlook.de",
    "outlook.dk",
    "outlook.es",
    "outlook.fr",
    "outlook.hu",
    "outlook.id",
    "outlook.ie",
    "outlook.in",
    "outlook.it",
    "outlook.jp",
    "outlook.kr",
    "outlook.lv",
    "outlook.my",
    "outlook.ph",
    "outlook.pt",
    "outlook.sa",
    "outlook.sg",
    "outlook.sk",
    "passport.com",
];

/// Represents a valid email address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactEmail(String);

impl ContactEmail {
    /// Parse and normalize an email address.
    ///
    /// The address is trimmed and lower-cased. Addresses at the large
    /// providers additionally lose their subaddress (and, for Gmail, the dots
    /// in the local part), so every spelling of a mailbox maps to the same
    /// value.
    pub fn parse(s: String) -> Result<Self, String> {
        let trimmed = validated(&s)?;
        normalize(trimmed)
            .map(Self)
            .ok_or_else(|| INVALID_EMAIL.to_string())
    }

    /// Parse an address that must be used exactly as written, such as a
    /// configured mailbox. Only surrounding whitespace is removed.
    pub fn parse_verbatim(s: String) -> Result<Self, String> {
        validated(&s).map(|email| Self(email.to_string()))
    }
}

fn validated(s: &str) -> Result<&str, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err("Email is required".to_string());
    }

    if !validate_email(trimmed) || !has_top_level_domain(trimmed) {
        return Err(INVALID_EMAIL.to_string());
    }

    Ok(trimmed)
}

/// Require a dotted domain, like `example.com`, not just `localhost`.
fn has_top_level_domain(email: &str) -> bool {
    match email.rsplit_once('@') {
        Some((_, domain)) => domain
            .rsplit_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty()),
        None => false,
    }
}

/// `None` when nothing is left of the local part.
fn normalize(email: &str) -> Option<String> {
    let email = email.to_lowercase();
    let (local, domain) = email.rsplit_once('@')?;

    let (local, domain) = if GMAIL_DOMAINS.contains(&domain) {
        (before(local, '+').replace('.', ""), "gmail.com")
    } else if OUTLOOK_DOMAINS.contains(&domain) || ICLOUD_DOMAINS.contains(&domain) {
        (before(local, '+').to_string(), domain)
    } else if YAHOO_DOMAINS.contains(&domain) {
        // Only the last `-` segment is the subaddress.
        let local = local.rsplit_once('-').map_or(local, |(mailbox, _)| mailbox);
        (local.to_string(), domain)
    } else if YANDEX_DOMAINS.contains(&domain) {
        (local.to_string(), "yandex.ru")
    } else {
        (local.to_string(), domain)
    };

    (!local.is_empty()).then(|| format!("{local}@{domain}"))
}

fn before(local: &str, separator: char) -> &str {
    local.split(separator).next().unwrap_or(local)
}

impl Display for ContactEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ContactEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
