mod common;

use rust_decimal_macros::dec;

use common::{contact, Fixture};
use stockkeep_core::{CategoryId, DomainError, Entity};
use stockkeep_inventory::TransactionType::In;

#[test]
fn product_update_never_touches_stock() {
    let fx = Fixture::new();
    let p = fx.product(12, 2);

    let mut details = fx.details("Renamed widget", 20);
    details.unit_price = dec!(9.99);
    let updated = fx.services.catalog.update_product(p, details).unwrap();

    assert_eq!(updated.name(), "Renamed widget");
    assert_eq!(updated.unit_price(), dec!(9.99));
    assert_eq!(updated.current_stock(), 12);
    assert!(updated.is_low_stock());
    assert_eq!(fx.stock(p), 12);
}

#[test]
fn product_creation_checks_references_and_input() {
    let fx = Fixture::new();

    let mut details = fx.details("Orphan", 0);
    details.category_id = CategoryId::new();
    let err = fx.services.catalog.create_product(details, 0).unwrap_err();
    assert!(matches!(err, DomainError::NotFound { entity: "category", .. }));

    let err = fx
        .services
        .catalog
        .create_product(fx.details("Negative", 0), -1)
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    let err = fx
        .services
        .catalog
        .create_product(fx.details("", 0), 0)
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    assert!(fx.services.catalog.list_products().unwrap().is_empty());
}

#[test]
fn referenced_rows_cannot_be_deleted() {
    let fx = Fixture::new();
    let p = fx.product(0, 0);
    fx.record(p, In, 1, 1).unwrap();

    let err = fx.services.catalog.delete_product(p).unwrap_err();
    assert!(matches!(err, DomainError::StillReferenced(_)));

    let err = fx.services.catalog.delete_category(fx.category_id).unwrap_err();
    assert!(matches!(err, DomainError::StillReferenced(_)));

    let err = fx.services.suppliers.delete(fx.supplier_id).unwrap_err();
    assert!(matches!(err, DomainError::StillReferenced(_)));

    assert_eq!(fx.stock(p), 1);
}

#[test]
fn unreferenced_rows_can_be_deleted() {
    let fx = Fixture::new();
    let p = fx.product(5, 0);

    fx.services.catalog.delete_product(p).unwrap();
    fx.services.catalog.delete_category(fx.category_id).unwrap();
    fx.services.suppliers.delete(fx.supplier_id).unwrap();

    assert!(fx.services.catalog.list_categories().unwrap().is_empty());
    assert!(fx.services.suppliers.list().unwrap().is_empty());
    assert!(matches!(
        fx.services.catalog.get_product(p),
        Err(DomainError::NotFound { .. })
    ));
}

#[test]
fn category_rename_is_validated() {
    let fx = Fixture::new();
    let renamed = fx
        .services
        .catalog
        .update_category(fx.category_id, "Fasteners", "Bolts and nuts")
        .unwrap();
    assert_eq!(renamed.name(), "Fasteners");

    let err = fx
        .services
        .catalog
        .update_category(fx.category_id, "", "")
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
    assert_eq!(fx.services.catalog.list_categories().unwrap()[0].name(), "Fasteners");
}

#[test]
fn supplier_lifecycle() {
    let fx = Fixture::new();
    let other = fx.services.suppliers.register("Globex", contact("Hank")).unwrap();
    assert!(other.is_active());

    let inactive = fx.services.suppliers.set_active(other.id(), false).unwrap();
    assert!(!inactive.is_active());
    assert!(fx.services.suppliers.set_active(other.id(), true).unwrap().is_active());

    let updated = fx
        .services
        .suppliers
        .update(other.id(), "Globex Corp", contact("Marge"))
        .unwrap();
    assert_eq!(updated.name(), "Globex Corp");
    assert_eq!(updated.contact().contact_person, "Marge");

    let mut bad = contact("Ned");
    bad.email = "not-an-email".to_string();
    let err = fx.services.suppliers.update(other.id(), "Globex", bad).unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
    assert_eq!(fx.services.suppliers.get(other.id()).unwrap(), updated);
}

#[test]
fn products_by_supplier_and_dashboard_summary() {
    let fx = Fixture::new();
    let low = fx.product(1, 5);
    let healthy = fx.product(50, 5);

    let other = fx.services.suppliers.register("Initech", contact("Bill")).unwrap();
    let mut details = fx.details("Stapler", 0);
    details.supplier_id = other.id();
    let elsewhere = fx.services.catalog.create_product(details, 3).unwrap();

    let mine: Vec<_> = fx
        .services
        .catalog
        .products_by_supplier(fx.supplier_id)
        .unwrap()
        .iter()
        .map(|p| p.id())
        .collect();
    assert_eq!(mine.len(), 2);
    assert!(mine.contains(&low) && mine.contains(&healthy));
    assert!(!mine.contains(&elsewhere.id()));

    let summary = fx.services.catalog.summary().unwrap();
    assert_eq!(summary.total_products, 3);
    assert_eq!(summary.total_suppliers, 2);
    let low_ids: Vec<_> = summary.low_stock_products.iter().map(|p| p.id()).collect();
    assert_eq!(low_ids, vec![low]);
}
