//! Warehouse schema types and the fixed sales warehouse definition

use serde::{Deserialize, Serialize};

/// Logical column type
///
/// Maps SQLite declared types onto the small set the warehouse uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalType {
    /// Integer (SQLite INTEGER affinity)
    Int,

    /// Floating point (SQLite REAL affinity)
    Float,

    /// String/text (SQLite TEXT affinity)
    String,

    /// Unknown type (cannot infer)
    Unknown,
}

impl LogicalType {
    /// SQL type keyword used in DDL
    pub fn sql_type(&self) -> &'static str {
        match self {
            Self::Int => "INTEGER",
            Self::Float => "REAL",
            Self::String => "TEXT",
            Self::Unknown => "BLOB",
        }
    }

    /// Derive a logical type from a declared SQLite column type
    ///
    /// Follows SQLite's affinity rules (section 3.1 of the datatype docs),
    /// except NUMERIC affinity which has no counterpart here.
    pub fn from_declared_type(declared: &str) -> Self {
        let upper = declared.to_ascii_uppercase();

        if upper.contains("INT") {
            Self::Int
        } else if upper.contains("CHAR") || upper.contains("CLOB") || upper.contains("TEXT") {
            Self::String
        } else if upper.contains("REAL") || upper.contains("FLOA") || upper.contains("DOUB") {
            Self::Float
        } else {
            Self::Unknown
        }
    }
}

impl std::fmt::Display for LogicalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int => write!(f, "INT"),
            Self::Float => write!(f, "FLOAT"),
            Self::String => write!(f, "STRING"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Nullability state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Nullability {
    /// Definitely nullable
    Yes,

    /// Definitely not nullable
    No,

    /// Cannot determine nullability
    Unknown,
}

/// A column in a table schema
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    pub name: String,

    /// Logical type
    pub logical_type: LogicalType,

    /// Nullability
    pub nullable: Nullability,

    /// Whether this column is the table's primary key
    pub primary_key: bool,
}

impl Column {
    /// Create a new non-key column with unknown nullability
    pub fn new(name: impl Into<String>, logical_type: LogicalType) -> Self {
        Self {
            name: name.into(),
            logical_type,
            nullable: Nullability::Unknown,
            primary_key: false,
        }
    }

    /// Set nullability
    pub fn with_nullability(mut self, nullable: Nullability) -> Self {
        self.nullable = nullable;
        self
    }

    /// Mark as primary key
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }
}

/// A foreign key declared by a table
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Referencing column in the declaring table
    pub column: String,

    /// Referenced table
    pub references_table: String,

    /// Referenced column
    pub references_column: String,
}

impl ForeignKey {
    pub fn new(
        column: impl Into<String>,
        references_table: impl Into<String>,
        references_column: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            references_table: references_table.into(),
            references_column: references_column.into(),
        }
    }
}

/// An ordered collection of columns plus table-level constraints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name
    pub name: String,

    /// Ordered list of columns
    pub columns: Vec<Column>,

    /// Declared foreign keys
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,
}

impl TableSchema {
    /// Create a table schema from columns
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
            foreign_keys: Vec::new(),
        }
    }

    /// Add a foreign key
    pub fn with_foreign_key(mut self, foreign_key: ForeignKey) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }

    /// Find a column by name
    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Position of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Get column names
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// The primary key column, if any
    pub fn primary_key(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.primary_key)
    }
}

/// The three warehouse entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Entity {
    Customer,
    Product,
    Sale,
}

impl Entity {
    /// Insert order: foreign-key targets before the table that references them
    pub const LOAD_ORDER: [Entity; 3] = [Entity::Customer, Entity::Product, Entity::Sale];

    /// Drop order: dependents before dependencies
    pub const DROP_ORDER: [Entity; 3] = [Entity::Sale, Entity::Customer, Entity::Product];

    /// Warehouse table name
    pub fn table_name(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Product => "product",
            Self::Sale => "sale",
        }
    }

    /// Business key column
    pub fn key_column(&self) -> &'static str {
        match self {
            Self::Customer => "customer_id",
            Self::Product => "product_id",
            Self::Sale => "sale_id",
        }
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.table_name())
    }
}

/// The full warehouse definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarehouseSchema {
    pub customer: TableSchema,
    pub product: TableSchema,
    pub sale: TableSchema,
}

impl WarehouseSchema {
    /// The fixed customer/product/sale star used by every load
    pub fn standard() -> Self {
        use LogicalType::{Float, Int, String};

        let customer = TableSchema::new(
            Entity::Customer.table_name(),
            vec![
                Column::new("customer_id", Int).primary_key(),
                Column::new("name", String),
                Column::new("region", String),
                Column::new("join_date", String),
                Column::new("loyalty_points", Int),
                Column::new("preferred_contact_method", String),
            ],
        );

        let product = TableSchema::new(
            Entity::Product.table_name(),
            vec![
                Column::new("product_id", Int).primary_key(),
                Column::new("product_name", String),
                Column::new("category", String),
                Column::new("unit_price", Float),
                Column::new("stock_quantity", Int),
                Column::new("supplier", String),
            ],
        );

        let sale = TableSchema::new(
            Entity::Sale.table_name(),
            vec![
                Column::new("sale_id", Int).primary_key(),
                Column::new("customer_id", Int),
                Column::new("product_id", Int),
                Column::new("sale_amount", Float),
                Column::new("sale_date", String),
                Column::new("discount_percent", Float),
                Column::new("payment_type", String),
                Column::new("store_id", Int),
                Column::new("campaign_id", Int),
            ],
        )
        .with_foreign_key(ForeignKey::new("customer_id", "customer", "customer_id"))
        .with_foreign_key(ForeignKey::new("product_id", "product", "product_id"));

        Self {
            customer,
            product,
            sale,
        }
    }

    /// Table definition for an entity
    pub fn table(&self, entity: Entity) -> &TableSchema {
        match entity {
            Entity::Customer => &self.customer,
            Entity::Product => &self.product,
            Entity::Sale => &self.sale,
        }
    }

    /// All tables in load order
    pub fn tables(&self) -> [&TableSchema; 3] {
        Entity::LOAD_ORDER.map(|entity| self.table(entity))
    }
}

impl Default for WarehouseSchema {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_column_has_unknown_nullability() {
        let column = Column::new("name", LogicalType::String);
        assert_eq!(column.nullable, Nullability::Unknown);
        assert!(!column.primary_key);
    }

    #[test]
    fn logical_type_display() {
        assert_eq!(LogicalType::Int.to_string(), "INT");
        assert_eq!(LogicalType::Float.sql_type(), "REAL");
    }

    #[test]
    fn declared_type_affinity() {
        assert_eq!(LogicalType::from_declared_type("INTEGER"), LogicalType::Int);
        assert_eq!(LogicalType::from_declared_type("bigint"), LogicalType::Int);
        assert_eq!(LogicalType::from_declared_type("VARCHAR(20)"), LogicalType::String);
        assert_eq!(LogicalType::from_declared_type("DOUBLE"), LogicalType::Float);
        assert_eq!(LogicalType::from_declared_type("BLOB"), LogicalType::Unknown);
    }

    #[test]
    fn standard_schema_shape() {
        let schema = WarehouseSchema::standard();
        let names: Vec<&str> = schema.tables().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["customer", "product", "sale"]);

        for entity in Entity::LOAD_ORDER {
            let table = schema.table(entity);
            assert_eq!(table.name, entity.table_name());
            assert_eq!(table.primary_key().unwrap().name, entity.key_column());
        }

        let sale = schema.table(Entity::Sale);
        assert_eq!(sale.columns.len(), 9);
        assert_eq!(sale.foreign_keys.len(), 2);
        assert_eq!(sale.column_index("sale_amount"), Some(3));
    }

    #[test]
    fn drop_order_puts_dependents_first() {
        assert_eq!(Entity::DROP_ORDER[0], Entity::Sale);
        assert_eq!(Entity::DROP_ORDER.map(|e| e.table_name()), ["sale", "customer", "product"]);
    }
}
