// This file contains all SQL statements issued by the sapatos server.
#![forbid(unsafe_code)]

// ========================= sapatos table =========================
pub const LIST_SHOES: &str = concat!(
    "SELECT id, nome, preco ",
    "FROM sapatos ORDER BY id",
);

pub const GET_SHOE: &str = concat!(
    "SELECT id, nome, preco ",
    "FROM sapatos WHERE id = ?",
);

// Locks the row until the enclosing transaction ends.
pub const GET_SHOE_FOR_UPDATE: &str = concat!(
    "SELECT id, nome, preco ",
    "FROM sapatos WHERE id = ? FOR UPDATE",
);

pub const INSERT_SHOE: &str = concat!(
    "INSERT INTO sapatos (nome, preco) ",
    "VALUES (?, ?)",
);

pub const DELETE_SHOE: &str = concat!(
    "DELETE FROM sapatos WHERE id = ?"
);

// Statement prefixes completed by the builders in db.rs.  Only placeholder
// clauses are ever appended.
pub const SEARCH_SHOES_PREFIX: &str = concat!(
    "SELECT id, nome, preco ",
    "FROM sapatos WHERE 1=1",
);

pub const SEARCH_SHOES_ORDER: &str = " ORDER BY id";

pub const UPDATE_SHOE_PREFIX: &str = "UPDATE sapatos SET ";
