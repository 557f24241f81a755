//! Fixed source-to-warehouse column renames, one table per entity

use salesdw_core::Entity;

const CUSTOMER_RENAMES: &[(&str, &str)] = &[
    ("CustomerID", "customer_id"),
    ("Name", "name"),
    ("Region", "region"),
    ("JoinDate", "join_date"),
    ("LoyaltyPoints", "loyalty_points"),
    ("PreferredContactMethod", "preferred_contact_method"),
];

const PRODUCT_RENAMES: &[(&str, &str)] = &[
    ("ProductID", "product_id"),
    ("ProductName", "product_name"),
    ("Category", "category"),
    ("UnitPrice", "unit_price"),
    ("StockQuantity", "stock_quantity"),
    ("Supplier", "supplier"),
];

const SALE_RENAMES: &[(&str, &str)] = &[
    ("TransactionID", "sale_id"),
    ("SaleDate", "sale_date"),
    ("CustomerID", "customer_id"),
    ("ProductID", "product_id"),
    ("StoreID", "store_id"),
    ("CampaignID", "campaign_id"),
    ("SaleAmount", "sale_amount"),
    ("DiscountPercent", "discount_percent"),
    ("PaymentType", "payment_type"),
];

/// Column rename table for one entity
#[derive(Debug, Clone, Copy)]
pub struct ColumnMapping {
    renames: &'static [(&'static str, &'static str)],
}

impl ColumnMapping {
    /// The mapping for an entity's extract
    pub fn for_entity(entity: Entity) -> Self {
        let renames = match entity {
            Entity::Customer => CUSTOMER_RENAMES,
            Entity::Product => PRODUCT_RENAMES,
            Entity::Sale => SALE_RENAMES,
        };

        Self { renames }
    }

    /// Canonical name for a source column; unmapped names pass through
    pub fn rename<'a>(&self, source: &'a str) -> &'a str {
        self.renames
            .iter()
            .find(|(from, _)| *from == source)
            .map(|(_, to)| *to)
            .unwrap_or(source)
    }

    /// Source column expected to supply a canonical column
    pub fn source_name(&self, canonical: &str) -> Option<&'static str> {
        self.renames
            .iter()
            .find(|(_, to)| *to == canonical)
            .map(|(from, _)| *from)
    }
}
