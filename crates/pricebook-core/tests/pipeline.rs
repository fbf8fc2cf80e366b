use anyhow::Result;
use pricebook_core::{
    archive, export_archive, import_archive, ImportError, ImportSummary, MemoryPriceStore,
    PriceStore, StoreError,
};

const HEADER: &str = "id,name,category,price,create_date\n";

fn upload(rows: &str) -> Vec<u8> {
    let payload = format!("{HEADER}{rows}");
    archive::pack(payload.as_bytes()).expect("pack upload")
}

#[tokio::test]
async fn import_skips_unparseable_price() -> Result<()> {
    let store = MemoryPriceStore::new();
    let bytes = upload(",Widget,Tools,9.99,2023-01-15\n,Bad,Tools,notanumber,2023-01-16\n");

    let summary = import_archive(&store, &bytes).await?;

    assert_eq!(
        summary,
        ImportSummary {
            total_items: 1,
            total_categories: 1,
            total_price: "9.99".into(),
        }
    );
    assert_eq!(store.len(), 1);
    Ok(())
}

#[tokio::test]
async fn summary_serializes_like_the_http_contract() -> Result<()> {
    let store = MemoryPriceStore::new();
    let summary = import_archive(&store, &upload(",A,X,1.5,2024-02-29\n")).await?;

    let json = serde_json::to_string(&summary)?;
    assert_eq!(
        json,
        r#"{"total_items":1,"total_categories":1,"total_price":"1.50"}"#
    );
    Ok(())
}

#[tokio::test]
async fn category_count_includes_existing_rows() -> Result<()> {
    let store = MemoryPriceStore::new();
    import_archive(&store, &upload(",Hammer,Tools,10,2023-01-01\n,Rake,Garden,5,2023-01-01\n"))
        .await?;

    let summary = import_archive(&store, &upload(",Saw,Tools,20,2023-02-01\n")).await?;

    assert_eq!(summary.total_items, 1);
    assert_eq!(summary.total_categories, 2);
    assert_eq!(summary.total_price, "20.00");
    Ok(())
}

#[tokio::test]
async fn failing_insert_rolls_back_the_whole_batch() -> Result<()> {
    let store = MemoryPriceStore::new();
    import_archive(&store, &upload(",Existing,Tools,1,2023-01-01\n")).await?;

    let too_long = "x".repeat(300);
    let rows = format!(",Good,Tools,2,2023-01-02\n,{too_long},Tools,3,2023-01-03\n,Later,Tools,4,2023-01-04\n");
    let err = import_archive(&store, &upload(&rows))
        .await
        .expect_err("constraint violation should fail the import");

    assert!(matches!(err, ImportError::Store(StoreError::Rejected { row: 1, .. })));
    assert!(!err.is_client_error());

    let names: Vec<String> = store.fetch_all().await?.into_iter().map(|r| r.name).collect();
    assert_eq!(names, ["Existing"]);
    Ok(())
}

#[tokio::test]
async fn archive_problems_are_client_errors() {
    let store = MemoryPriceStore::new();

    let err = import_archive(&store, b"not a zip").await.expect_err("bad archive");
    assert!(err.is_client_error());

    let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    zip.start_file("other.csv", zip::write::FileOptions::default())
        .expect("start entry");
    let bytes = zip.finish().expect("finish").into_inner();

    let err = import_archive(&store, &bytes).await.expect_err("missing entry");
    assert!(err.is_client_error());
    assert!(store.is_empty());
}

#[tokio::test]
async fn header_only_upload_reports_existing_categories() -> Result<()> {
    let store = MemoryPriceStore::new();
    import_archive(&store, &upload(",A,X,1,2023-01-01\n,B,Y,1,2023-01-01\n")).await?;

    let summary = import_archive(&store, &upload("")).await?;
    assert_eq!(summary.total_items, 0);
    assert_eq!(summary.total_categories, 2);
    assert_eq!(summary.total_price, "0.00");
    Ok(())
}

#[tokio::test]
async fn export_of_empty_table_has_only_header() -> Result<()> {
    let store = MemoryPriceStore::new();

    let bytes = export_archive(&store).await?;
    let payload = archive::unpack(&bytes)?;

    assert_eq!(payload, HEADER.as_bytes());
    Ok(())
}

#[tokio::test]
async fn export_then_reimport_reproduces_values() -> Result<()> {
    let source = MemoryPriceStore::new();
    import_archive(
        &source,
        &upload(",Widget,Tools,9.99,2023-01-15\n,Rake,Garden,12.5,2022-11-02\n,\"Bolt, hex\",Tools,0.3,2021-06-30\n"),
    )
    .await?;

    let exported = export_archive(&source).await?;
    let text = String::from_utf8(archive::unpack(&exported)?)?;
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], HEADER.trim_end());
    assert_eq!(lines[1], "1,Widget,Tools,9.99,2023-01-15");
    assert_eq!(lines[2], "2,Rake,Garden,12.50,2022-11-02");

    let target = MemoryPriceStore::new();
    import_archive(&target, &upload(",Seed,Misc,1,2020-01-01\n")).await?;
    let summary = import_archive(&target, &exported).await?;
    assert_eq!(summary.total_items, 3);
    assert_eq!(summary.total_price, "22.79");

    let strip = |rows: Vec<pricebook_core::StoredPrice>| {
        rows.into_iter()
            .map(|r| (r.name, r.category, format!("{:.2}", r.price), r.create_date))
            .collect::<Vec<_>>()
    };
    let original = strip(source.fetch_all().await?);
    let reimported = strip(target.fetch_all().await?);
    assert_eq!(reimported[1..], original[..]);

    let new_ids: Vec<i64> = target.fetch_all().await?.iter().map(|r| r.id).collect();
    assert_eq!(new_ids, [1, 2, 3, 4]);
    Ok(())
}
