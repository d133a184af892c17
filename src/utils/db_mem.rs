// In-memory repository used by the endpoint tests.
#![forbid(unsafe_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::utils::db::{SharedRepository, ShoeRepository};
use crate::utils::db_types::{NewShoe, Shoe, ShoeChanges, ShoeFilter};
use crate::utils::errors::{DriverErrorCode, StoreError};

#[derive(Default)]
struct MemState {
    shoes: Vec<Shoe>,
    next_id: i32,
}

/// Holds records in a vector, counts every storage access and can be told
/// to fail every access with a given driver code.
#[derive(Default)]
pub struct MemShoeRepository {
    state: Mutex<MemState>,
    failure: Mutex<Option<DriverErrorCode>>,
    accesses: AtomicUsize,
}

impl MemShoeRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_shoes(shoes: &[(&str, f64)]) -> Arc<Self> {
        let repo = Self::default();
        {
            let mut state = repo.state.lock().unwrap();
            for (nome, preco) in shoes {
                state.next_id += 1;
                let id = state.next_id;
                state.shoes.push(Shoe::new(id, nome.to_string(), *preco));
            }
        }
        Arc::new(repo)
    }

    pub fn shared(self: &Arc<Self>) -> SharedRepository {
        self.clone()
    }

    pub fn fail_with(&self, code: DriverErrorCode) {
        *self.failure.lock().unwrap() = Some(code);
    }

    pub fn accesses(&self) -> usize {
        self.accesses.load(Ordering::SeqCst)
    }

    pub fn count(&self) -> usize {
        self.state.lock().unwrap().shoes.len()
    }

    pub fn find(&self, id: i32) -> Option<Shoe> {
        self.state.lock().unwrap().shoes.iter().find(|s| s.id == id).cloned()
    }

    fn touch(&self) -> Result<(), StoreError> {
        self.accesses.fetch_add(1, Ordering::SeqCst);
        match &*self.failure.lock().unwrap() {
            Some(code) => Err(StoreError::new(code.clone(), "injected failure")),
            None => Ok(()),
        }
    }
}

// Same semantics as the MySQL search: case-insensitive substring on nome,
// exact preco, both when given.
fn matches(filter: &ShoeFilter, shoe: &Shoe) -> bool {
    let nome_ok = match &filter.nome {
        Some(n) => shoe.nome.to_lowercase().contains(&n.to_lowercase()),
        None => true,
    };
    let preco_ok = match filter.preco {
        Some(p) => shoe.preco == p,
        None => true,
    };
    nome_ok && preco_ok
}

#[async_trait]
impl ShoeRepository for MemShoeRepository {
    async fn list(&self) -> Result<Vec<Shoe>, StoreError> {
        self.touch()?;
        Ok(self.state.lock().unwrap().shoes.clone())
    }

    async fn search(&self, filter: &ShoeFilter) -> Result<Vec<Shoe>, StoreError> {
        self.touch()?;
        let state = self.state.lock().unwrap();
        Ok(state.shoes.iter().filter(|s| matches(filter, s)).cloned().collect())
    }

    async fn get(&self, id: i32) -> Result<Option<Shoe>, StoreError> {
        self.touch()?;
        Ok(self.find(id))
    }

    async fn create(&self, shoe: &NewShoe) -> Result<i32, StoreError> {
        self.touch()?;
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = state.next_id;
        state.shoes.push(Shoe::new(id, shoe.nome.clone(), shoe.preco));
        Ok(id)
    }

    async fn update(&self, id: i32, changes: &ShoeChanges) -> Result<bool, StoreError> {
        self.touch()?;
        let mut state = self.state.lock().unwrap();
        match state.shoes.iter_mut().find(|s| s.id == id) {
            Some(shoe) => {
                if let Some(nome) = &changes.nome {
                    shoe.nome = nome.clone();
                }
                if let Some(preco) = changes.preco {
                    shoe.preco = preco;
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: i32) -> Result<bool, StoreError> {
        self.touch()?;
        let mut state = self.state.lock().unwrap();
        let before = state.shoes.len();
        state.shoes.retain(|s| s.id != id);
        Ok(state.shoes.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_matching() {
        let shoe = Shoe::new(1, "Tênis Corrida".to_string(), 150.0);
        assert!(matches(&ShoeFilter::new(Some("corr".to_string()), None), &shoe));
        assert!(matches(&ShoeFilter::new(Some("TÊNIS".to_string()), Some(150.0)), &shoe));
        assert!(!matches(&ShoeFilter::new(Some("bota".to_string()), None), &shoe));
        assert!(!matches(&ShoeFilter::new(None, Some(149.99)), &shoe));
    }
}
