//! Perk catalog - partner deals and their engagement counters
//!
//! Static deals come from the seed dataset; the dashboard appends dynamic
//! deals at runtime (append-only, never edited or removed). Each partner
//! also carries two counter maps:
//!
//! - view counters: pseudo-constant, derived from a deterministic seed so
//!   repeated reads are stable; one partner has a pinned total that is
//!   redistributed across its deals whenever a deal is added
//! - redemption counters: random-seeded at startup, incremented by one on
//!   every partner-perk redemption, never decremented
//!
//! All mutation for one partner happens under that partner's map entry
//! write guard, so deal-id allocation and counter updates are atomic per
//! partner.

use std::collections::HashMap;

use dashmap::DashMap;
use rand::Rng;
use thiserror::Error;

use crate::core_types::DealId;
use crate::models::{Deal, Partner, Perk};
use crate::seed;

#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("Partner not found")]
    PartnerNotFound,
    #[error("title and description are required")]
    MissingDealFields,
}

/// One deal with its counters, as shown on the dashboard.
#[derive(Debug, Clone)]
pub struct DealStats {
    pub deal: Deal,
    pub views: u64,
    pub redemptions: u64,
}

/// Partner-level aggregates for the dashboard stats card.
#[derive(Debug, Clone, Copy)]
pub struct PartnerStats {
    pub total_deals: usize,
    pub active_deals: usize,
    pub total_views: u64,
    pub total_redemptions: u64,
}

#[derive(Debug, Default)]
struct PartnerBook {
    dynamic_deals: Vec<Deal>,
    redemptions: HashMap<DealId, u64>,
    views: HashMap<DealId, u64>,
}

/// Owned service state for the perk catalog.
pub struct PerkCatalog {
    partners: &'static [Partner],
    books: DashMap<String, PartnerBook>,
}

impl PerkCatalog {
    /// Build the catalog and eagerly seed every partner's counters.
    pub fn new() -> Self {
        let catalog = Self {
            partners: &seed::PARTNERS,
            books: DashMap::new(),
        };
        catalog.seed_counters(&mut rand::thread_rng());
        catalog
    }

    fn seed_counters(&self, rng: &mut impl Rng) {
        for partner in self.partners {
            let mut book = PartnerBook::default();
            for deal in &partner.deals {
                book.redemptions.insert(deal.id, rng.gen_range(10..=500));
            }
            match partner.pinned_total_views {
                Some(total) => {
                    let ids: Vec<DealId> = partner.deals.iter().map(|d| d.id).collect();
                    distribute_views(&mut book.views, &ids, total);
                }
                None => {
                    for deal in &partner.deals {
                        book.views.insert(deal.id, seeded_views(partner.id, deal.id));
                    }
                }
            }
            self.books.insert(partner.slug.clone(), book);
        }
        tracing::info!(partners = self.partners.len(), "perk counters seeded");
    }

    pub fn general_perks(&self) -> &'static [Perk] {
        &seed::GENERAL_PERKS
    }

    pub fn partners(&self) -> &'static [Partner] {
        self.partners
    }

    /// Case-insensitive slug lookup.
    pub fn partner_by_slug(&self, slug: &str) -> Option<&'static Partner> {
        self.partners
            .iter()
            .find(|p| p.slug.eq_ignore_ascii_case(slug))
    }

    /// Static deals followed by dynamic deals, in append order.
    pub fn deals_for(&self, slug: &str) -> Result<(&'static Partner, Vec<Deal>), CatalogError> {
        let partner = self
            .partner_by_slug(slug)
            .ok_or(CatalogError::PartnerNotFound)?;
        let mut deals = partner.deals.clone();
        if let Some(book) = self.books.get(&partner.slug) {
            deals.extend(book.dynamic_deals.iter().cloned());
        }
        Ok((partner, deals))
    }

    /// Append a dashboard-created deal.
    ///
    /// The new id is strictly greater than every existing static and
    /// dynamic id for the partner. Its redemption counter starts at zero;
    /// its view counter is either the deterministic seed or, for the
    /// pinned-total partner, the result of redistributing the total over
    /// all deals.
    pub fn add_deal(
        &self,
        slug: &str,
        title: &str,
        description: &str,
        full_description: Option<String>,
        icon: Option<String>,
    ) -> Result<Deal, CatalogError> {
        if title.trim().is_empty() || description.trim().is_empty() {
            return Err(CatalogError::MissingDealFields);
        }
        let partner = self
            .partner_by_slug(slug)
            .ok_or(CatalogError::PartnerNotFound)?;

        let mut book = self
            .books
            .entry(partner.slug.clone())
            .or_default();

        let max_static = partner.deals.iter().map(|d| d.id).max().unwrap_or(0);
        let max_dynamic = book.dynamic_deals.iter().map(|d| d.id).max().unwrap_or(0);
        let deal_id = max_static.max(max_dynamic) + 1;

        let deal = Deal {
            id: deal_id,
            title: title.to_string(),
            description: description.to_string(),
            full_description: full_description.unwrap_or_else(|| description.to_string()),
            icon: icon.unwrap_or_else(|| "gift".to_string()),
        };
        book.dynamic_deals.push(deal.clone());
        book.redemptions.insert(deal_id, 0);

        match partner.pinned_total_views {
            Some(total) => {
                let ids: Vec<DealId> = partner
                    .deals
                    .iter()
                    .map(|d| d.id)
                    .chain(book.dynamic_deals.iter().map(|d| d.id))
                    .collect();
                distribute_views(&mut book.views, &ids, total);
            }
            None => {
                book.views.insert(deal_id, seeded_views(partner.id, deal_id));
            }
        }

        tracing::info!(
            partner = %partner.slug,
            deal_id,
            title = %deal.title,
            dynamic_deals = book.dynamic_deals.len(),
            "new deal added"
        );
        Ok(deal)
    }

    /// Bump a deal's redemption counter by one and return the new count.
    ///
    /// Counts are initialized on first redemption for ids the seed never
    /// saw, so the operation tolerates deals added after startup (and, as
    /// in the source system, ids it has never heard of).
    pub fn redeem(&self, slug: &str, deal_id: DealId) -> Result<u64, CatalogError> {
        let partner = self
            .partner_by_slug(slug)
            .ok_or(CatalogError::PartnerNotFound)?;

        let mut book = self
            .books
            .entry(partner.slug.clone())
            .or_default();
        let count = book.redemptions.entry(deal_id).or_insert(0);
        *count += 1;
        Ok(*count)
    }

    /// Redemption counts per deal, for the dashboard.
    pub fn redemption_counts(&self, slug: &str) -> Result<HashMap<DealId, u64>, CatalogError> {
        let partner = self
            .partner_by_slug(slug)
            .ok_or(CatalogError::PartnerNotFound)?;
        Ok(self
            .books
            .get(&partner.slug)
            .map(|book| book.redemptions.clone())
            .unwrap_or_default())
    }

    /// All deals with their counters, static first then dynamic.
    pub fn deal_stats(&self, slug: &str) -> Result<Vec<DealStats>, CatalogError> {
        let (partner, deals) = self.deals_for(slug)?;
        let book = self.books.get(&partner.slug);
        Ok(deals
            .into_iter()
            .map(|deal| {
                let views = book
                    .as_ref()
                    .and_then(|b| b.views.get(&deal.id).copied())
                    .unwrap_or(100);
                let redemptions = book
                    .as_ref()
                    .and_then(|b| b.redemptions.get(&deal.id).copied())
                    .unwrap_or(0);
                DealStats {
                    deal,
                    views,
                    redemptions,
                }
            })
            .collect())
    }

    /// Partner aggregates. Every deal counts as active.
    pub fn stats(&self, slug: &str) -> Result<PartnerStats, CatalogError> {
        let rows = self.deal_stats(slug)?;
        Ok(PartnerStats {
            total_deals: rows.len(),
            active_deals: rows.len(),
            total_views: rows.iter().map(|r| r.views).sum(),
            total_redemptions: rows.iter().map(|r| r.redemptions).sum(),
        })
    }
}

impl Default for PerkCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Deterministic per-deal view count for unpinned partners:
/// `100 + ((partner_id * 1000 + deal_id) % 900)`, stable across reads.
fn seeded_views(partner_id: u32, deal_id: DealId) -> u64 {
    let seed = u64::from(partner_id) * 1000 + u64::from(deal_id);
    100 + (seed % 900)
}

/// Spread `total` views over `ids`: everyone gets `total / n`, the first
/// `total % n` deals get one extra, so the sum is exactly `total`.
fn distribute_views(views: &mut HashMap<DealId, u64>, ids: &[DealId], total: u64) {
    if ids.is_empty() {
        return;
    }
    let count = ids.len() as u64;
    let base = total / count;
    let remainder = (total % count) as usize;
    views.clear();
    for (index, id) in ids.iter().enumerate() {
        let extra = if index < remainder { 1 } else { 0 };
        views.insert(*id, base + extra);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_counters_in_range() {
        let catalog = PerkCatalog::new();
        for partner in catalog.partners() {
            let counts = catalog.redemption_counts(&partner.slug).unwrap();
            assert_eq!(counts.len(), partner.deals.len());
            for count in counts.values() {
                assert!((10..=500).contains(count));
            }
        }
    }

    #[test]
    fn test_pinned_partner_views_sum_to_total() {
        let catalog = PerkCatalog::new();
        let stats = catalog.stats("aldi").unwrap();
        assert_eq!(stats.total_views, 10_000);
    }

    #[test]
    fn test_unpinned_views_follow_seed_formula() {
        let catalog = PerkCatalog::new();
        for row in catalog.deal_stats("lidl").unwrap() {
            assert_eq!(row.views, seeded_views(2, row.deal.id));
        }
        // The formula itself is stable and in [100, 1000)
        assert_eq!(seeded_views(2, 1), 100 + (2001 % 900));
        for partner_id in 1..=4 {
            for deal_id in 1..=20 {
                let views = seeded_views(partner_id, deal_id);
                assert!((100..1000).contains(&views));
            }
        }
    }

    #[test]
    fn test_add_deal_ids_strictly_increase() {
        let catalog = PerkCatalog::new();
        let first = catalog
            .add_deal("lidl", "Late Deal", "Something new", None, None)
            .unwrap();
        let second = catalog
            .add_deal("lidl", "Later Deal", "Something newer", None, None)
            .unwrap();

        assert_eq!(first.id, 4); // lidl has 3 static deals
        assert_eq!(second.id, 5);
        assert_eq!(first.full_description, "Something new");
        assert_eq!(first.icon, "gift");

        let (_, deals) = catalog.deals_for("lidl").unwrap();
        assert_eq!(deals.len(), 5);
        assert_eq!(deals[3].id, 4);
        assert_eq!(deals[4].id, 5);
    }

    #[test]
    fn test_add_deal_rebalances_pinned_views() {
        let catalog = PerkCatalog::new();
        for i in 0..3 {
            catalog
                .add_deal("aldi", &format!("Deal {i}"), "Promo", None, None)
                .unwrap();
            let stats = catalog.stats("aldi").unwrap();
            assert_eq!(stats.total_views, 10_000, "pinned total must survive add #{i}");
        }
        // 8 deals over 10,000: base 1250, exact split
        for row in catalog.deal_stats("aldi").unwrap() {
            assert_eq!(row.views, 1250);
        }
    }

    #[test]
    fn test_add_deal_validation() {
        let catalog = PerkCatalog::new();
        assert_eq!(
            catalog.add_deal("aldi", "", "desc", None, None),
            Err(CatalogError::MissingDealFields)
        );
        assert_eq!(
            catalog.add_deal("aldi", "title", " ", None, None),
            Err(CatalogError::MissingDealFields)
        );
        assert_eq!(
            catalog.add_deal("tesco", "title", "desc", None, None),
            Err(CatalogError::PartnerNotFound)
        );
    }

    #[test]
    fn test_redeem_increments_and_initializes() {
        let catalog = PerkCatalog::new();
        let before = catalog.redemption_counts("coop").unwrap()[&1];
        assert_eq!(catalog.redeem("coop", 1).unwrap(), before + 1);
        assert_eq!(catalog.redeem("coop", 1).unwrap(), before + 2);

        // Unseeded deal id starts from zero
        assert_eq!(catalog.redeem("coop", 99).unwrap(), 1);

        assert_eq!(
            catalog.redeem("tesco", 1),
            Err(CatalogError::PartnerNotFound)
        );
    }

    #[test]
    fn test_slug_lookup_is_case_insensitive() {
        let catalog = PerkCatalog::new();
        assert!(catalog.partner_by_slug("ALDI").is_some());
        assert!(catalog.deals_for("Morrisons").is_ok());
        assert!(catalog.partner_by_slug("tesco").is_none());
    }

    #[test]
    fn test_new_deal_starts_at_zero_redemptions() {
        let catalog = PerkCatalog::new();
        let deal = catalog
            .add_deal("morrisons", "Fresh", "New promo", None, Some("leaf".into()))
            .unwrap();
        let counts = catalog.redemption_counts("morrisons").unwrap();
        assert_eq!(counts[&deal.id], 0);

        let row = catalog
            .deal_stats("morrisons")
            .unwrap()
            .into_iter()
            .find(|r| r.deal.id == deal.id)
            .unwrap();
        assert_eq!(row.views, seeded_views(3, deal.id));
        assert_eq!(row.deal.icon, "leaf");
    }
}
