//! The sell command: one full pass through the checkout flow.

use kasse_core::{Cart, CheckoutSession, PaymentMethod, ProductId};

use super::{CURRENCY_CODE, Manager, catalog::ensure_catalog};

/// Run one sale: accumulate the cart, print the summary, drive the
/// checkout session, and clear the cart once the sale finished.
pub async fn run(
    manager: &Manager,
    items: &[String],
    method: PaymentMethod,
    tendered: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = ensure_catalog(manager).await?;

    let mut cart = Cart::new();
    for spec in items {
        let (id, quantity) = parse_item(spec)?;
        cart.add_many(id, quantity);
    }

    for line in cart.line_items(&catalog)? {
        println!(
            "{:>3} x {:<30} {:>12}",
            line.quantity,
            line.product.name,
            line.line_total.display_with(CURRENCY_CODE)
        );
    }
    let total = cart.total(&catalog)?;
    println!("Total: {}", total.display_with(CURRENCY_CODE));

    let mut session = CheckoutSession::new(total);
    session.select_payment(method)?;

    if method == PaymentMethod::Cash {
        let raw = tendered.ok_or("cash sales need --tendered <amount>")?;
        let tender = session.enter_tendered_amount(raw)?;
        println!("Tendered: {}", tender.tendered.display_with(CURRENCY_CODE));
        println!("Change due: {}", tender.change_due.display_with(CURRENCY_CODE));
        if session.is_undertendered() {
            tracing::warn!("tendered amount is below the total");
        }
    }

    let receipt = session.finish()?;
    cart.clear();
    println!("Sale finished ({}).", receipt.method);
    Ok(())
}

/// Parse an item spec: `<product-id>` or `<product-id>=<quantity>`.
fn parse_item(spec: &str) -> Result<(ProductId, u32), String> {
    match spec.split_once('=') {
        None => Ok((ProductId::new(spec), 1)),
        Some((id, raw_quantity)) => {
            let quantity: u32 = raw_quantity
                .parse()
                .map_err(|_| format!("invalid quantity in item spec {spec:?}"))?;
            if quantity == 0 {
                return Err(format!("quantity must be at least 1 in item spec {spec:?}"));
            }
            Ok((ProductId::new(id), quantity))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_item_bare_id() {
        assert_eq!(parse_item("p1").unwrap(), (ProductId::new("p1"), 1));
    }

    #[test]
    fn test_parse_item_with_quantity() {
        assert_eq!(parse_item("p1=3").unwrap(), (ProductId::new("p1"), 3));
    }

    #[test]
    fn test_parse_item_rejects_bad_quantity() {
        assert!(parse_item("p1=zero").is_err());
        assert!(parse_item("p1=0").is_err());
    }
}
