//! Contact dispatch
//!
//! `{(Bunny, Carrot): collect, *: ignore}`, in either body order.

use super::ports::{BodyId, Category, Contact};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactAction {
    /// Player touched a carrot
    CollectCarrot { player: BodyId, carrot: BodyId },
    Ignore,
}

pub fn dispatch(contact: &Contact) -> ContactAction {
    match (contact.category_a, contact.category_b) {
        (Category::BUNNY, Category::CARROT) => ContactAction::CollectCarrot {
            player: contact.body_a,
            carrot: contact.body_b,
        },
        (Category::CARROT, Category::BUNNY) => ContactAction::CollectCarrot {
            player: contact.body_b,
            carrot: contact.body_a,
        },
        _ => ContactAction::Ignore,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(a: Category, b: Category) -> Contact {
        Contact {
            body_a: BodyId(1),
            category_a: a,
            body_b: BodyId(2),
            category_b: b,
        }
    }

    #[test]
    fn test_carrot_either_order() {
        assert_eq!(
            dispatch(&contact(Category::BUNNY, Category::CARROT)),
            ContactAction::CollectCarrot { player: BodyId(1), carrot: BodyId(2) }
        );
        assert_eq!(
            dispatch(&contact(Category::CARROT, Category::BUNNY)),
            ContactAction::CollectCarrot { player: BodyId(2), carrot: BodyId(1) }
        );
    }

    #[test]
    fn test_other_pairs_ignored() {
        assert_eq!(dispatch(&contact(Category::BUNNY, Category::GROUND)), ContactAction::Ignore);
        assert_eq!(dispatch(&contact(Category::GROUND, Category::CARROT)), ContactAction::Ignore);
        assert_eq!(dispatch(&contact(Category::CARROT, Category::CARROT)), ContactAction::Ignore);
    }
}
