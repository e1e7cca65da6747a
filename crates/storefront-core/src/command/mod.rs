// ── Command API ──
//
// All write operations flow through a unified `Command` enum.
// `ProductApi::execute` routes each variant to the products client and,
// on success, invalidates the cache tags the mutation touches.

pub mod requests;

use crate::cache::Tag;
use crate::model::{Product, ProductId};

pub use requests::{CreateProductRequest, ImageUpload, UpdateProductRequest};

/// All write operations against the products API.
#[derive(Debug, Clone)]
pub enum Command {
    CreateProduct(CreateProductRequest),
    UpdateProduct {
        id: ProductId,
        update: UpdateProductRequest,
    },
    DeleteProduct {
        id: ProductId,
    },
}

impl Command {
    /// Tags invalidated once this command succeeds.
    pub fn invalidates(&self) -> Vec<Tag> {
        match self {
            Self::CreateProduct(_) | Self::DeleteProduct { .. } => vec![Tag::AllProducts],
            Self::UpdateProduct { id, .. } => vec![Tag::Product(id.clone())],
        }
    }
}

/// Result of a successfully executed command.
#[derive(Debug, Clone)]
pub enum CommandResult {
    /// The server confirmed without returning an entity.
    Ok,
    Product(Product),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutations_invalidate_their_tags() {
        let id = ProductId::from("42");

        let delete = Command::DeleteProduct { id: id.clone() };
        assert_eq!(delete.invalidates(), vec![Tag::AllProducts]);

        let update = Command::UpdateProduct {
            id: id.clone(),
            update: UpdateProductRequest::default(),
        };
        assert_eq!(update.invalidates(), vec![Tag::Product(id)]);
    }
}
