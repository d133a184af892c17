// This file contains the sapatos database structs and related definitions.
#![forbid(unsafe_code)]

// ---------------------------------------------------------------------------
// sapatos:
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq)]
pub struct Shoe {
    pub id: i32,
    pub nome: String,
    pub preco: f64,
}

impl Shoe {
    pub fn new(id: i32, nome: String, preco: f64) -> Shoe {
        Shoe { id, nome, preco }
    }
}

#[derive(Debug, Clone)]
pub struct NewShoe {
    pub nome: String,
    pub preco: f64,
}

impl NewShoe {
    pub fn new(nome: String, preco: f64) -> NewShoe {
        NewShoe { nome, preco }
    }
}

// ---------------------------------------------------------------------------
// ShoeChanges:
// ---------------------------------------------------------------------------
/// The fields of a partial update.  Only the fields that are `Some` are
/// written; the others keep their stored values.
#[derive(Debug, Clone, Default)]
pub struct ShoeChanges {
    pub nome: Option<String>,
    pub preco: Option<f64>,
}

impl ShoeChanges {
    pub fn new(nome: Option<String>, preco: Option<f64>) -> ShoeChanges {
        ShoeChanges { nome, preco }
    }

    pub fn is_empty(&self) -> bool {
        self.nome.is_none() && self.preco.is_none()
    }
}

// ---------------------------------------------------------------------------
// ShoeFilter:
// ---------------------------------------------------------------------------
/// Conjunctive search filter: `nome` is a case-insensitive substring,
/// `preco` an exact value.
#[derive(Debug, Clone, Default)]
pub struct ShoeFilter {
    pub nome: Option<String>,
    pub preco: Option<f64>,
}

impl ShoeFilter {
    pub fn new(nome: Option<String>, preco: Option<f64>) -> ShoeFilter {
        ShoeFilter { nome, preco }
    }

    pub fn is_empty(&self) -> bool {
        self.nome.is_none() && self.preco.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emptiness() {
        assert!(ShoeFilter::default().is_empty());
        assert!(ShoeChanges::default().is_empty());
        assert!(!ShoeChanges::new(None, Some(1.0)).is_empty());
    }
}
