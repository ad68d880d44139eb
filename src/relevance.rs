//! Title relevance filtering.
//!
//! Accessory listings (cables, cases, chargers, mounts) dominate noisy result
//! pages for popular products and must never be returned as if they were the
//! product itself, so the blacklist runs before any keyword matching can
//! accept a title.

use std::collections::HashSet;

/// Accessory markers that disqualify a title outright.
const ACCESSORY_BLACKLIST: &[&str] = &[
    "mídia",
    "media",
    "access",
    "carregamento",
    "carregador",
    "charging",
    "dock",
    "base",
    "suporte",
    "stand",
    "cabo",
    "cable",
    "capa",
    "case",
    "skin",
    "silicone",
    "película",
    "pelicula",
    "adaptador",
    "adapter",
    "volante",
    "arcade",
    "adesivo",
    "borracha",
    "ventoinha",
];

const WIRELESS_MARKERS: &[&str] = &["sem fio", "wireless"];

/// Decide whether a candidate title matches the intent of the query.
///
/// Two stages: the accessory blacklist rejects regardless of keyword overlap,
/// then controller-for-PlayStation queries get a strict product-line rule
/// while everything else falls back to a keyword-overlap threshold. The
/// strict branch trades recall for precision on the query shape where
/// accessory noise is worst.
pub fn is_relevant(title: &str, keywords: &[String]) -> bool {
    let t = title.to_lowercase();

    if ACCESSORY_BLACKLIST.iter().any(|b| t.contains(b)) {
        return false;
    }

    let has_controller = keywords.iter().any(|k| k == "controle" || k == "control");
    let wants_playstation = keywords
        .iter()
        .any(|k| k == "ps5" || k == "playstation" || k == "5");

    if has_controller && wants_playstation {
        let is_dualsense = t.contains("dualsense");
        let is_edge = t.contains("edge");
        let is_wireless = WIRELESS_MARKERS.iter().any(|w| t.contains(w));
        let mentions_playstation = t.contains("ps5") || t.contains("playstation");
        return is_dualsense
            || is_edge
            || (t.contains("controle") && is_wireless && mentions_playstation);
    }

    let distinct: HashSet<&str> = keywords.iter().map(String::as_str).collect();
    let hits = distinct.iter().filter(|k| t.contains(*k)).count();
    hits >= (distinct.len() / 2).clamp(1, 2)
}

#[cfg(test)]
mod tests {
    use super::is_relevant;

    fn kw(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn blacklisted_accessory_rejected_despite_full_keyword_match() {
        assert!(!is_relevant("Cabo Carregador Controle PS5", &kw(&["controle", "ps5"])));
        assert!(!is_relevant("Capa Silicone Controle PS5 DualSense", &kw(&["controle", "ps5"])));
        assert!(!is_relevant("Volante Gamer PS5", &kw(&["controle", "ps5"])));
    }

    #[test]
    fn controller_intent_accepts_product_line_markers() {
        let keywords = kw(&["controle", "ps5"]);
        assert!(is_relevant("Controle Sony DualSense Branco", &keywords));
        assert!(is_relevant("Controle DualSense Edge PS5", &keywords));
        // The product-line marker alone qualifies.
        assert!(is_relevant("Controle Edge Branco", &keywords));
    }

    #[test]
    fn controller_intent_accepts_generic_wireless_console_combo() {
        let keywords = kw(&["controle", "playstation"]);
        assert!(is_relevant("Controle Sem Fio para PlayStation 5", &keywords));
        assert!(!is_relevant("Controle Sem Fio Xbox Series", &keywords));
        assert!(!is_relevant("Controle com fio PS5 barato", &keywords));
    }

    #[test]
    fn generic_queries_use_overlap_threshold() {
        let keywords = kw(&["ssd", "nvme", "1tb", "kingston"]);
        // 4 distinct keywords require 2 hits.
        assert!(is_relevant("SSD Kingston NV2 2TB", &keywords));
        assert!(!is_relevant("HD Externo Seagate 1tb", &keywords));

        // A single keyword requires one hit.
        assert!(is_relevant("Monitor Gamer 144hz", &kw(&["monitor"])));
        assert!(!is_relevant("Teclado Mecânico", &kw(&["monitor"])));
    }
}
