//! Product command handlers: listing, detail, and the create/update/delete
//! flows.

use std::fmt::Write as _;
use std::str::FromStr;

use tabled::Tabled;
use tracing::debug;

use storefront_core::form::{Field, FormController, FormState, NETWORK_FAILURE, PreviewRegistry};
use storefront_core::{
    Category, Command as CoreCommand, CommandResult, CoreError, Price, Product, ProductApi,
    ProductId, Route, SubmitOutcome, UpdateProductRequest,
};

use crate::cli::{CreateArgs, GlobalOpts, ProductsArgs, ProductsCommand, UpdateArgs};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ProductRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Image")]
    image: String,
}

impl From<&Product> for ProductRow {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id.to_string(),
            name: p.name.clone(),
            price: format!("${}", p.price),
            category: p.category.label().into(),
            image: p.primary_image().unwrap_or_default().into(),
        }
    }
}

fn detail(p: &Product, color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", output::heading(&p.name, color));
    let _ = writeln!(out, "{}", output::price(&format!("${}", p.price), color));
    if let Some(ref description) = p.description {
        let _ = writeln!(out, "{description}");
    }
    let _ = writeln!(out, "Category: {}", p.category.label());
    if let Some(image) = p.primary_image() {
        let _ = writeln!(out, "Image:    {image}");
    }
    let _ = write!(out, "{}", output::muted(&format!("ID:       {}", p.id), color));
    if let Some(created) = p.created_at {
        let _ = write!(
            out,
            "\n{}",
            output::muted(&format!("Created:  {}", created.format("%Y-%m-%d %H:%M UTC")), color)
        );
    }
    out
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    api: &ProductApi,
    args: ProductsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ProductsCommand::List => list(api, global).await,

        ProductsCommand::Get { id } => {
            let id = ProductId::from(id);
            let product = api.fetch_product(&id).await.map_err(not_found)?;
            print_product(&product, global);
            Ok(())
        }

        ProductsCommand::Create(create_args) => create(api, create_args, global).await,

        ProductsCommand::Update(update_args) => {
            let id = ProductId::from(update_args.id.as_str());
            let update = build_update(update_args)?;
            let result = api
                .execute(CoreCommand::UpdateProduct { id, update })
                .await
                .map_err(not_found)?;
            if let CommandResult::Product(product) = result {
                if !global.quiet {
                    eprintln!("✓ Product updated");
                }
                print_product(&product, global);
            }
            Ok(())
        }

        ProductsCommand::Delete { id } => {
            if !util::confirm(&format!("Delete product {id}?"), global.yes)? {
                return Ok(());
            }
            api.execute(CoreCommand::DeleteProduct {
                id: ProductId::from(id),
            })
            .await
            .map_err(not_found)?;
            if !global.quiet {
                eprintln!("✓ Product deleted");
            }
            Ok(())
        }
    }
}

async fn list(api: &ProductApi, global: &GlobalOpts) -> Result<(), CliError> {
    let products = api.fetch_products().await?;
    let out = output::render_list(
        &global.output,
        products.as_slice(),
        |p| ProductRow::from(p),
        |p| p.id.to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

fn print_product(product: &Product, global: &GlobalOpts) {
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        product,
        |p| detail(p, color),
        |p| p.id.to_string(),
    );
    output::print_output(&out, global.quiet);
}

/// A 404 on a single product reads as "Product not found".
fn not_found(err: CoreError) -> CliError {
    if err.is_not_found() {
        CliError::NotFound {
            message: "Product not found".into(),
        }
    } else {
        err.into()
    }
}

// ── Create ──────────────────────────────────────────────────────────

async fn create(api: &ProductApi, args: CreateArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut form = FormController::new(PreviewRegistry::new());
    form.set_name(args.name);
    form.set_description(args.description);
    form.set_price(args.price);
    form.set_category(args.category);

    let files = util::read_images(&args.images)?;
    for rejected in form.select_images(files) {
        if !global.quiet {
            eprintln!("  skipped {}: {}", rejected.file_name, rejected.error);
        }
    }

    let spinner = util::spinner("Creating...", global.quiet);
    let outcome = form.submit(api).await;
    spinner.finish_and_clear();

    match outcome {
        SubmitOutcome::Created { product, next } => {
            if !global.quiet {
                eprintln!("✓ Created product '{}' ({})", product.name, product.id);
            }
            debug!(route = %next, "navigating after create");
            if next == Route::Products && !global.quiet {
                list(api, global).await?;
            }
            Ok(())
        }
        SubmitOutcome::Blocked => Err(CliError::InvalidForm {
            details: field_report(form.state()),
        }),
        SubmitOutcome::Failed => {
            let state = form.state();
            match state.general_error.as_deref() {
                Some(NETWORK_FAILURE) => Err(CliError::ConnectionFailed {
                    reason: NETWORK_FAILURE.into(),
                }),
                general => Err(CliError::Rejected {
                    message: general.unwrap_or("the product was not created").into(),
                    details: field_report(state),
                }),
            }
        }
    }
}

/// One `Label: message` line per field error, in form order.
fn field_report(state: &FormState) -> String {
    Field::ALL
        .iter()
        .filter_map(|&field| {
            state
                .error(field)
                .map(|err| format!("{}: {}", field.label(), err.message()))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Update ──────────────────────────────────────────────────────────

fn build_update(args: UpdateArgs) -> Result<UpdateProductRequest, CliError> {
    let price = args
        .price
        .map(|raw| {
            Price::parse(&raw).map_err(|e| CliError::Validation {
                field: "price".into(),
                reason: e.to_string(),
            })
        })
        .transpose()?;
    let category = args
        .category
        .map(|raw| {
            Category::from_str(&raw).map_err(|_| CliError::Validation {
                field: "category".into(),
                reason: format!("'{raw}' is not one of {}", util::category_names()),
            })
        })
        .transpose()?;

    let update = UpdateProductRequest {
        name: args.name,
        description: args.description,
        price,
        category,
        images: None,
    };
    if update.is_empty() {
        return Err(CliError::Validation {
            field: "update".into(),
            reason: "pass at least one of --name, --description, --price, --category".into(),
        });
    }
    Ok(update)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn update_args() -> UpdateArgs {
        UpdateArgs {
            id: "42".into(),
            name: None,
            description: None,
            price: None,
            category: None,
        }
    }

    #[test]
    fn empty_update_is_rejected() {
        assert!(matches!(
            build_update(update_args()),
            Err(CliError::Validation { .. })
        ));
    }

    #[test]
    fn update_parses_price_and_category() {
        let update = build_update(UpdateArgs {
            price: Some("24.50".into()),
            category: Some("Books".into()),
            ..update_args()
        })
        .unwrap();

        assert_eq!(update.price.map(Price::value), Some(24.5));
        assert_eq!(update.category, Some(Category::Books));
        assert!(update.name.is_none());
    }

    #[test]
    fn unknown_category_lists_the_choices() {
        let err = build_update(UpdateArgs {
            category: Some("toys".into()),
            ..update_args()
        })
        .unwrap_err();

        match err {
            CliError::Validation { field, reason } => {
                assert_eq!(field, "category");
                assert!(reason.contains("electronics, clothing, home, books"));
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn row_shows_dollar_price_and_first_image() {
        let product = Product {
            id: ProductId::from("1"),
            name: "Mug".into(),
            description: None,
            price: Price::new(8.5).unwrap(),
            category: Category::Home,
            images: vec!["a.png".into(), "b.png".into()],
            created_at: None,
        };

        let row = ProductRow::from(&product);

        assert_eq!(row.price, "$8.5");
        assert_eq!(row.category, "Home & Garden");
        assert_eq!(row.image, "a.png");
        assert!(detail(&product, false).starts_with("Mug\n$8.5\n"));
    }
}
