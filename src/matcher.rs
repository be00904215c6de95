// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Tag matching.
//!
//! Telemetry is aggregated per *tag*: the text of a logged query up to its
//! parameter list or call-site marker (see [`derive_tag`]). Callers hand us a
//! method *signature*, which is resolved against the known tags with two rules,
//! tried in order over the whole candidate list:
//!
//! 1. case-insensitive equality, first with the trimmed signature as given and
//!    then with its derived tag;
//! 2. case-insensitive suffix match in either direction between the derived
//!    tag and the candidate (the tag ends with the signature, or the signature
//!    ends with the tag).
//!
//! The first candidate satisfying a rule wins; there is no further scoring.

use once_cell::sync::Lazy;
use regex::Regex;

/// Marker that call-site query tagging inserts after the tag text.
pub const CALL_SITE_MARKER: &str = "-- file:";

static TAG_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^(.*?)(?:\(|-- file:)").unwrap());

/// Extract the grouping tag from raw query text.
///
/// Takes everything before the first `(` or [`CALL_SITE_MARKER`]; text with
/// neither is used whole. The result is trimmed.
pub fn derive_tag(query_text: &str) -> &str {
    match TAG_PREFIX.captures(query_text).and_then(|c| c.get(1)) {
        Some(prefix) => prefix.as_str().trim(),
        None => query_text.trim(),
    }
}

/// Which rule produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    Exact,
    Suffix,
}

/// A resolved candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagMatch<'a> {
    /// The matched candidate key.
    pub tag: &'a str,
    /// Position of the candidate in the list searched.
    pub index: usize,
    pub rule: MatchRule,
}

/// Resolves one incoming signature against candidate tag keys.
#[derive(Debug, Clone)]
pub struct TagMatcher {
    raw: String,
    raw_folded: String,
    signature: String,
    folded: String,
}

impl TagMatcher {
    /// Prepare a matcher. `None` and whitespace-only signatures become empty and
    /// never match. Suffix matching uses the signature reduced with [`derive_tag`].
    pub fn new(signature: Option<&str>) -> Self {
        let raw = signature.unwrap_or_default().trim().to_string();
        let raw_folded = raw.to_lowercase();
        let signature = derive_tag(&raw).to_string();
        let folded = signature.to_lowercase();
        Self {
            raw,
            raw_folded,
            signature,
            folded,
        }
    }

    /// The trimmed signature as given.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The signature reduced to its tag.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Equality with the raw signature or its derived tag, ignoring case.
    pub fn matches_exact(&self, key: &str) -> bool {
        self.matches_raw(key) || self.matches_derived(key)
    }

    fn matches_raw(&self, key: &str) -> bool {
        !self.is_empty() && key.trim().to_lowercase() == self.raw_folded
    }

    fn matches_derived(&self, key: &str) -> bool {
        !self.folded.is_empty() && key.trim().to_lowercase() == self.folded
    }

    pub fn matches_suffix(&self, key: &str) -> bool {
        if self.folded.is_empty() || key.trim().is_empty() {
            return false;
        }
        let key = key.trim().to_lowercase();
        key.ends_with(&self.folded) || self.folded.ends_with(&key)
    }

    /// Find the first candidate equal to the raw signature, else equal to the
    /// derived tag, else matching by suffix.
    pub fn find<'a, K: AsRef<str>>(&self, candidates: &'a [K]) -> Option<TagMatch<'a>> {
        if self.is_empty() {
            return None;
        }

        let position = |accept: fn(&Self, &str) -> bool| {
            candidates.iter().position(|key| accept(self, key.as_ref()))
        };

        let found = position(Self::matches_raw)
            .or_else(|| position(Self::matches_derived))
            .map(|index| (index, MatchRule::Exact))
            .or_else(|| position(Self::matches_suffix).map(|index| (index, MatchRule::Suffix)));

        found.map(|(index, rule)| TagMatch {
            tag: candidates[index].as_ref(),
            index,
            rule,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_tag() {
        assert_eq!(derive_tag("Shop.Orders.GetOrders(@p0, @p1)"), "Shop.Orders.GetOrders");
        assert_eq!(
            derive_tag("Shop.Orders.GetOrders -- file: Orders.cs:42\nSELECT 1"),
            "Shop.Orders.GetOrders"
        );
        assert_eq!(derive_tag("  Shop.Orders.List  "), "Shop.Orders.List");
        assert_eq!(derive_tag(""), "");
    }

    #[test]
    fn test_derive_tag_uses_earliest_delimiter() {
        assert_eq!(derive_tag("A.B -- file: x.cs (line 3)"), "A.B");
        assert_eq!(derive_tag("A.B(x) -- file: x.cs"), "A.B");
    }

    #[test]
    fn test_exact_match_wins_over_earlier_suffix() {
        let keys = ["Orders.GetOrders", "shop.orders.getorders"];
        let matcher = TagMatcher::new(Some("Shop.Orders.GetOrders"));
        let found = matcher.find(&keys).unwrap();
        assert_eq!(found.tag, "shop.orders.getorders");
        assert_eq!(found.index, 1);
        assert_eq!(found.rule, MatchRule::Exact);
    }

    #[test]
    fn test_suffix_match_both_directions() {
        let matcher = TagMatcher::new(Some("Shop.Orders.GetOrders"));
        assert!(matcher.matches_suffix("Orders.GetOrders"));
        assert!(matcher.matches_suffix("App.Shop.Orders.GetOrders"));
        assert!(!matcher.matches_suffix("Shop.Orders"));
        assert!(!matcher.matches_suffix("   "));
    }

    #[test]
    fn test_first_suffix_candidate_wins() {
        let keys = vec![
            "Other.Thing".to_string(),
            "Orders.GetOrders".to_string(),
            "GetOrders".to_string(),
        ];
        let matcher = TagMatcher::new(Some("Shop.Orders.GetOrders"));
        let found = matcher.find(&keys).unwrap();
        assert_eq!(found.index, 1);
        assert_eq!(found.rule, MatchRule::Suffix);
    }

    #[test]
    fn test_signature_is_trimmed_and_parameters_dropped() {
        let matcher = TagMatcher::new(Some("  Shop.Orders.GetOrders(int id)  "));
        assert_eq!(matcher.signature(), "Shop.Orders.GetOrders");
        assert!(matcher.matches_exact("SHOP.ORDERS.GETORDERS"));
    }

    #[test]
    fn test_tag_with_parameter_list_matches_itself() {
        let keys = ["Orders.Get", "Orders.Get(int id)"];
        let matcher = TagMatcher::new(Some("orders.get(INT ID)"));
        assert_eq!(matcher.raw(), "orders.get(INT ID)");
        assert_eq!(matcher.signature(), "orders.get");

        let found = matcher.find(&keys).unwrap();
        assert_eq!(found.index, 1);
        assert_eq!(found.rule, MatchRule::Exact);
    }

    #[test]
    fn test_tag_with_call_site_marker_matches_itself() {
        let keys = ["Shop.Report", "Shop.Report -- file: Report.cs"];
        let matcher = TagMatcher::new(Some("Shop.Report -- file: Report.cs"));
        let found = matcher.find(&keys).unwrap();
        assert_eq!(found.index, 1);
        assert_eq!(found.rule, MatchRule::Exact);
    }

    #[test]
    fn test_derived_tag_still_matches_exactly() {
        let keys = ["Other.Get", "Shop.Orders.GetOrders"];
        let matcher = TagMatcher::new(Some("Shop.Orders.GetOrders(int id)"));
        let found = matcher.find(&keys).unwrap();
        assert_eq!(found.index, 1);
        assert_eq!(found.rule, MatchRule::Exact);
    }

    #[test]
    fn test_empty_signature_never_matches() {
        let keys = ["Shop.Orders.GetOrders"];
        assert!(TagMatcher::new(None).find(&keys).is_none());
        assert!(TagMatcher::new(Some("   ")).find(&keys).is_none());
    }

    #[test]
    fn test_no_match() {
        let keys = ["Shop.Orders.GetOrders"];
        let matcher = TagMatcher::new(Some("Billing.Invoices.Create"));
        assert!(matcher.find(&keys).is_none());
    }
}
