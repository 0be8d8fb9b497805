//! [`Listing`] form.

use rust_decimal::Decimal;

use crate::{
    domain::{self, listing, user},
    validation::{Errors, Validate},
};

/// Form creating a new [`domain::Listing`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Listing {
    /// Title of the listing.
    pub title: String,

    /// Description of the listing.
    pub description: String,

    /// Name of the [`listing::Category`].
    pub category: String,

    /// Name of the [`listing::Condition`].
    pub condition: String,

    /// Price in dollars, as typed by the user.
    pub price: String,

    /// Size, if applicable.
    pub size: String,

    /// Indicator whether the listing is offered for trade only.
    pub trade_only: bool,

    /// URLs of the already uploaded images.
    pub images: Vec<String>,
}

impl Validate for Listing {
    fn validate(&self) -> Errors {
        let mut errors = Errors::new();

        _ = errors
            .field("title", &self.title)
            .required("Title is required")
            .min_chars(
                listing::Title::MIN_LEN,
                "Title must be at least 3 characters",
            )
            .max_chars(
                listing::Title::MAX_LEN,
                "Title must be at most 100 characters",
            );
        _ = errors
            .field("description", &self.description)
            .required("Description is required")
            .max_chars(
                listing::Description::MAX_LEN,
                "Description must be at most 2000 characters",
            );
        _ = errors
            .field("category", &self.category)
            .required("Category is required")
            .check(
                |c| c.parse::<listing::Category>().is_ok(),
                "Unknown category",
            );
        _ = errors
            .field("condition", &self.condition)
            .required("Condition is required")
            .check(
                |c| c.parse::<listing::Condition>().is_ok(),
                "Unknown condition",
            );
        _ = errors
            .field("price", &self.price)
            .required_unless(self.trade_only, "Price is required")
            .non_negative_decimal("Price must be a valid positive number")
            .decimal_below(
                listing::Price::LIMIT,
                "Price must be less than 100000",
            );
        _ = errors
            .field("size", &self.size)
            .optional()
            .max_chars(
                listing::Size::MAX_LEN,
                "Size must be at most 50 characters",
            );

        if self.images.len() > listing::ImageUrl::MAX_PER_LISTING {
            errors.add("images", "At most 6 images are allowed");
        } else if self
            .images
            .iter()
            .any(|i| listing::ImageUrl::new(i.trim()).is_none())
        {
            errors.add("images", "Invalid image URL");
        }

        errors
    }
}

impl Listing {
    /// Validates this [`Listing`] form and turns it into a new active
    /// [`domain::Listing`] of the provided `seller`.
    ///
    /// # Errors
    ///
    /// If this [`Listing`] form is invalid.
    pub fn into_listing(
        self,
        seller: user::Id,
    ) -> Result<domain::Listing, Errors> {
        self.validate().into_result()?;

        let mut errors = Errors::new();
        let title = require(
            &mut errors,
            "title",
            listing::Title::new(self.title.trim()),
        );
        let description = require(
            &mut errors,
            "description",
            listing::Description::new(self.description.trim()),
        );
        let category = require(
            &mut errors,
            "category",
            self.category.trim().parse::<listing::Category>().ok(),
        );
        let condition = require(
            &mut errors,
            "condition",
            self.condition.trim().parse::<listing::Condition>().ok(),
        );
        let price = match self.price.trim() {
            "" => Some(None),
            p => require(
                &mut errors,
                "price",
                p.parse::<Decimal>()
                    .ok()
                    .and_then(listing::Price::new)
                    .map(Some),
            ),
        };
        let size = match self.size.trim() {
            "" => Some(None),
            s => require(&mut errors, "size", listing::Size::new(s).map(Some)),
        };
        let images = require(
            &mut errors,
            "images",
            self.images
                .iter()
                .map(|i| listing::ImageUrl::new(i.trim()))
                .collect::<Option<Vec<_>>>(),
        );

        match (title, description, category, condition, price, size, images) {
            (
                Some(title),
                Some(description),
                Some(category),
                Some(condition),
                Some(price),
                Some(size),
                Some(images),
            ) => Ok(domain::Listing {
                id: listing::Id::new(),
                seller_id: seller,
                title,
                description,
                category,
                condition,
                size,
                price,
                trade_only: self.trade_only,
                images,
                status: listing::Status::Active,
                created_at: listing::CreationDateTime::now(),
            }),
            _ => Err(errors),
        }
    }
}

/// Records an error of the `field` into the provided [`Errors`] if there is
/// no `value`.
fn require<T>(
    errors: &mut Errors,
    field: &'static str,
    value: Option<T>,
) -> Option<T> {
    if value.is_none() {
        errors.add(field, "Invalid value");
    }
    value
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::{listing, user},
        validation::Validate as _,
    };

    use super::Listing;

    fn valid() -> Listing {
        Listing {
            title: "Völkl Mantra M6".into(),
            description: "Two seasons, freshly tuned.".into(),
            category: "skis".into(),
            condition: "GOOD".into(),
            price: "350.00".into(),
            size: "177".into(),
            trade_only: false,
            images: vec!["https://cdn.example.com/mantra.jpg".into()],
        }
    }

    #[test]
    fn accepts_valid_form() {
        assert!(valid().validate().is_empty());
    }

    #[test]
    fn reports_missing_title_and_negative_price() {
        let form = Listing {
            title: String::new(),
            trade_only: false,
            price: "-5".into(),
            ..valid()
        };

        let errors = form.validate();

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("title"), Some("Title is required"));
        assert_eq!(
            errors.get("price"),
            Some("Price must be a valid positive number"),
        );
    }

    #[test]
    fn price_optional_for_trade() {
        let form = Listing {
            price: String::new(),
            trade_only: true,
            ..valid()
        };
        assert!(form.validate().is_empty());

        let form = Listing {
            price: String::new(),
            trade_only: false,
            ..valid()
        };
        assert_eq!(form.validate().get("price"), Some("Price is required"));
    }

    #[test]
    fn requires_category_and_condition() {
        let form = Listing {
            category: String::new(),
            condition: "mint".into(),
            ..valid()
        };

        let errors = form.validate();

        assert_eq!(errors.get("category"), Some("Category is required"));
        assert_eq!(errors.get("condition"), Some("Unknown condition"));
    }

    #[test]
    fn limits_images() {
        let form = Listing {
            images: vec!["https://cdn.example.com/a.jpg".into(); 7],
            ..valid()
        };

        assert_eq!(
            form.validate().get("images"),
            Some("At most 6 images are allowed"),
        );
    }

    #[test]
    fn is_deterministic() {
        let form = Listing {
            title: "ab".into(),
            ..valid()
        };

        assert_eq!(form.validate(), form.validate());
    }

    #[test]
    fn converts_into_listing() {
        let seller = user::Id::new();

        let l = valid().into_listing(seller).unwrap();

        assert_eq!(l.seller_id, seller);
        assert_eq!(AsRef::<str>::as_ref(&l.title), "Völkl Mantra M6");
        assert_eq!(l.category, listing::Category::Skis);
        assert_eq!(l.condition, listing::Condition::Good);
        assert_eq!(
            l.price.map(|p| p.amount().to_string()).as_deref(),
            Some("350.00"),
        );
        assert_eq!(l.status, listing::Status::Active);
    }
}
