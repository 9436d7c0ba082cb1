//! Reverse index tables.
//!
//! One `master` row per indexed Deck Master, then one child row per rule:
//!
//! | table       | columns                   | key                    |
//! |-------------|---------------------------|------------------------|
//! | `attribute` | `master_id, value`        | `(value, master_id)`   |
//! | `race`      | `master_id, value`        | `(value, master_id)`   |
//! | `archetype` | `master_id, value`        | `(value, master_id)`   |
//! | `mention`   | `master_id, value` (text) | `(value, master_id)`   |
//! | `stat`      | `master_id, atk, def`     | `(atk, def, master_id)`|
//!
//! Keys lead with the value so the reverse queries are index lookups.
//! The master row is always written before its children.

use rusqlite::Connection;

use crate::core::Result;

pub const MASTER_TABLE: &str = "master";
pub const ATTRIBUTE_TABLE: &str = "attribute";
pub const RACE_TABLE: &str = "race";
pub const ARCHETYPE_TABLE: &str = "archetype";
pub const MENTION_TABLE: &str = "mention";
pub const STAT_TABLE: &str = "stat";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS master (
    id INTEGER PRIMARY KEY
);
CREATE TABLE IF NOT EXISTS attribute (
    master_id INTEGER NOT NULL REFERENCES master(id),
    value     INTEGER NOT NULL,
    PRIMARY KEY (value, master_id)
);
CREATE TABLE IF NOT EXISTS race (
    master_id INTEGER NOT NULL REFERENCES master(id),
    value     INTEGER NOT NULL,
    PRIMARY KEY (value, master_id)
);
CREATE TABLE IF NOT EXISTS archetype (
    master_id INTEGER NOT NULL REFERENCES master(id),
    value     INTEGER NOT NULL,
    PRIMARY KEY (value, master_id)
);
CREATE TABLE IF NOT EXISTS mention (
    master_id INTEGER NOT NULL REFERENCES master(id),
    value     VARCHAR(255) NOT NULL,
    PRIMARY KEY (value, master_id)
);
CREATE TABLE IF NOT EXISTS stat (
    master_id INTEGER NOT NULL REFERENCES master(id),
    atk       INTEGER NOT NULL,
    def       INTEGER NOT NULL,
    PRIMARY KEY (atk, def, master_id)
);
";

/// Create any missing table. Safe to run on an existing index.
pub fn create(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}
