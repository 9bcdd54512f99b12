use serde::{Deserialize, Serialize};

/// A table whose rows are removed as part of another record's cascade.
///
/// Auxiliary rows have no lifecycle of their own (no `deleted_at` marker) and
/// are hard-deleted inside the owning record's permanent-delete transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadeTarget {
    /// The auxiliary table to delete from.
    pub table: &'static str,
    /// The column referencing the owning record's id.
    pub ref_column: &'static str,
}

/// The closed set of entity types participating in the soft-delete lifecycle.
///
/// Each kind maps to exactly one table carrying the `deleted_at`/`deleted_by`
/// marker pair. The registry is the single source of truth for table names,
/// snapshot columns, cascade rules, and sweep ordering — SQL never
/// interpolates caller-supplied identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Comment,
    Post,
    Listing,
    Profile,
    Account,
}

impl EntityKind {
    /// Sweep processing order: children before parents, so that by the time a
    /// parent's permanent delete runs, its lifecycle-managed dependents have
    /// already been purged by their own pass. Accounts are the root of most
    /// foreign keys and go last.
    pub const SWEEP_ORDER: [EntityKind; 5] = [
        EntityKind::Comment,
        EntityKind::Post,
        EntityKind::Listing,
        EntityKind::Profile,
        EntityKind::Account,
    ];

    /// The table backing this entity kind.
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Comment => "comments",
            EntityKind::Post => "posts",
            EntityKind::Listing => "listings",
            EntityKind::Profile => "profiles",
            EntityKind::Account => "accounts",
        }
    }

    /// Columns captured in the pre-deletion snapshot.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            EntityKind::Comment => &[
                "id",
                "post_id",
                "author_id",
                "body",
                "created_at",
                "deleted_at",
                "deleted_by",
            ],
            EntityKind::Post => &[
                "id",
                "author_id",
                "title",
                "body",
                "created_at",
                "deleted_at",
                "deleted_by",
            ],
            EntityKind::Listing => &[
                "id",
                "seller_id",
                "title",
                "price_cents",
                "created_at",
                "deleted_at",
                "deleted_by",
            ],
            EntityKind::Profile => &[
                "id",
                "account_id",
                "display_name",
                "bio",
                "created_at",
                "deleted_at",
                "deleted_by",
            ],
            EntityKind::Account => &["id", "email", "created_at", "deleted_at", "deleted_by"],
        }
    }

    /// Pure auxiliary rows removed inside this kind's permanent-delete
    /// transaction, in declaration order.
    pub fn cascade_targets(&self) -> &'static [CascadeTarget] {
        match self {
            EntityKind::Comment => &[CascadeTarget {
                table: "comment_reactions",
                ref_column: "comment_id",
            }],
            EntityKind::Post => &[
                CascadeTarget {
                    table: "post_reactions",
                    ref_column: "post_id",
                },
                CascadeTarget {
                    table: "post_tags",
                    ref_column: "post_id",
                },
            ],
            EntityKind::Listing => &[
                CascadeTarget {
                    table: "listing_bookmarks",
                    ref_column: "listing_id",
                },
                CascadeTarget {
                    table: "listing_images",
                    ref_column: "listing_id",
                },
            ],
            EntityKind::Profile => &[
                CascadeTarget {
                    table: "profile_follows",
                    ref_column: "follower_id",
                },
                CascadeTarget {
                    table: "profile_follows",
                    ref_column: "followee_id",
                },
            ],
            EntityKind::Account => &[CascadeTarget {
                table: "sessions",
                ref_column: "account_id",
            }],
        }
    }

    /// Entity kinds whose rows reference this kind but carry their own
    /// lifecycle. They are never cascaded here; `SWEEP_ORDER` guarantees
    /// their pass runs first.
    pub fn lifecycle_dependents(&self) -> &'static [EntityKind] {
        match self {
            EntityKind::Comment => &[],
            EntityKind::Post => &[EntityKind::Comment],
            EntityKind::Listing => &[],
            EntityKind::Profile => &[],
            EntityKind::Account => &[
                EntityKind::Comment,
                EntityKind::Post,
                EntityKind::Listing,
                EntityKind::Profile,
            ],
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Comment => write!(f, "comment"),
            EntityKind::Post => write!(f, "post"),
            EntityKind::Listing => write!(f, "listing"),
            EntityKind::Profile => write!(f, "profile"),
            EntityKind::Account => write!(f, "account"),
        }
    }
}

impl std::str::FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "comment" => Ok(EntityKind::Comment),
            "post" => Ok(EntityKind::Post),
            "listing" => Ok(EntityKind::Listing),
            "profile" => Ok(EntityKind::Profile),
            "account" => Ok(EntityKind::Account),
            _ => Err(format!("Invalid entity kind: {}", s)),
        }
    }
}
