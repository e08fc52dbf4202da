use chrono::Utc;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    Consideration, CreateOfferCmd, CreatePostCmd, Engine, EngineError, NewItem, OfferListFilter,
    OfferStatus, PostStatus, TradeStatus, UpdateOfferCmd, UpdatePostCmd,
};
use migration::MigratorTrait;

const ALICE: i32 = 1;
const BOB: i32 = 2;
const CAROL: i32 = 3;
const CATEGORY: i32 = 1;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    for username in ["alice", "bob", "carol"] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, password, created_at) VALUES (?, ?, ?)",
            vec![username.into(), "password".into(), Utc::now().into()],
        ))
        .await
        .unwrap();
    }
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO categories (name) VALUES (?)",
        vec!["Electronics".into()],
    ))
    .await
    .unwrap();
    let engine = Engine::builder().database(db.clone()).build().await.unwrap();
    (engine, db)
}

fn item(name: &str) -> NewItem {
    NewItem {
        name: name.to_string(),
        ..Default::default()
    }
}

async fn open_post(engine: &Engine, author_id: i32, title: &str) -> i32 {
    engine
        .create_post(
            CreatePostCmd::new(author_id, title, CATEGORY)
                .items(vec![item("Something to trade")]),
        )
        .await
        .unwrap()
        .id
}

async fn post_status(engine: &Engine, post_id: i32) -> PostStatus {
    engine.post_detail(post_id).await.unwrap().post.status
}

#[tokio::test]
async fn create_offer_is_pending_with_normalized_items() {
    let (engine, _db) = engine_with_db().await;
    let post_id = open_post(&engine, ALICE, "Vintage Guitar for Trade").await;

    let offer = engine
        .create_offer(
            CreateOfferCmd::new(post_id, BOB)
                .message("Interested in a swap?")
                .items(vec![
                    item("  Gaming Laptop  "),
                    item("   "),
                    NewItem {
                        name: "Monitor".to_string(),
                        quantity: Some(-3),
                        ..Default::default()
                    },
                ]),
        )
        .await
        .unwrap();

    assert_eq!(offer.status, OfferStatus::Pending);
    assert_eq!(offer.items.len(), 2);
    assert_eq!(offer.items[0].name, "Gaming Laptop");
    assert_eq!(offer.items[0].condition, "unspecified");
    assert_eq!(offer.items[1].quantity, 1);
    assert_eq!(offer.author.unwrap().username, "bob");
    assert_eq!(offer.post.unwrap().author_id, ALICE);
    // Creating an offer never touches the post.
    assert_eq!(post_status(&engine, post_id).await, PostStatus::Open);
}

#[tokio::test]
async fn create_offer_with_all_invalid_items_yields_zero_items() {
    let (engine, _db) = engine_with_db().await;
    let post_id = open_post(&engine, ALICE, "Camera Lenses").await;

    let offer = engine
        .create_offer(CreateOfferCmd::new(post_id, BOB).items(vec![item(""), item("  ")]))
        .await
        .unwrap();

    assert_eq!(offer.status, OfferStatus::Pending);
    assert!(offer.items.is_empty());
}

#[tokio::test]
async fn create_offer_against_closed_post_conflicts() {
    let (engine, _db) = engine_with_db().await;
    let post_id = open_post(&engine, ALICE, "Antique Chair Set").await;
    engine
        .update_post(UpdatePostCmd::new(post_id, ALICE).status(PostStatus::Closed))
        .await
        .unwrap();

    let err = engine
        .create_offer(CreateOfferCmd::new(post_id, BOB))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));
}

#[tokio::test]
async fn create_offer_against_missing_post_is_not_found() {
    let (engine, _db) = engine_with_db().await;
    let err = engine
        .create_offer(CreateOfferCmd::new(999, BOB))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn child_post_must_differ_from_parent() {
    let (engine, _db) = engine_with_db().await;
    let post_id = open_post(&engine, ALICE, "Pottery Set").await;

    let err = engine
        .create_offer(CreateOfferCmd::new(post_id, ALICE).child_post(post_id))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidArgument(_)));

    // Nothing was created.
    let page = engine
        .list_offers(
            &OfferListFilter {
                post_id: Some(post_id),
                ..Default::default()
            },
            None,
            None,
        )
        .await
        .unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn child_post_must_exist() {
    let (engine, _db) = engine_with_db().await;
    let post_id = open_post(&engine, ALICE, "Pottery Set").await;

    let err = engine
        .create_offer(CreateOfferCmd::new(post_id, BOB).child_post(999))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidArgument(_)));
}

#[tokio::test]
async fn child_post_must_belong_to_the_author() {
    let (engine, _db) = engine_with_db().await;
    let post_id = open_post(&engine, ALICE, "Pottery Set").await;
    let carols_post = open_post(&engine, CAROL, "Tool Collection").await;

    let err = engine
        .create_offer(CreateOfferCmd::new(post_id, BOB).child_post(carols_post))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn update_offer_replaces_items_wholesale() {
    let (engine, _db) = engine_with_db().await;
    let post_id = open_post(&engine, ALICE, "Gaming Laptop").await;
    let offer = engine
        .create_offer(CreateOfferCmd::new(post_id, BOB).items(vec![item("Desk"), item("Chair")]))
        .await
        .unwrap();
    assert_eq!(offer.items.len(), 2);

    let updated = engine
        .update_offer(UpdateOfferCmd::new(offer.id, BOB).items(vec![item("Bookshelf")]))
        .await
        .unwrap();
    assert_eq!(updated.items.len(), 1);
    assert_eq!(updated.items[0].name, "Bookshelf");

    // A replacement that normalizes to nothing leaves zero items, not the
    // previous ones.
    let cleared = engine
        .update_offer(UpdateOfferCmd::new(offer.id, BOB).items(vec![item("   ")]))
        .await
        .unwrap();
    assert!(cleared.items.is_empty());
}

#[tokio::test]
async fn update_offer_switches_between_items_and_child_post() {
    let (engine, _db) = engine_with_db().await;
    let post_id = open_post(&engine, ALICE, "Record Player").await;
    let bobs_post = open_post(&engine, BOB, "Vinyl Collection").await;

    let offer = engine
        .create_offer(CreateOfferCmd::new(post_id, BOB).items(vec![item("Speakers")]))
        .await
        .unwrap();

    let linked = engine
        .update_offer(UpdateOfferCmd::new(offer.id, BOB).child_post(bobs_post))
        .await
        .unwrap();
    assert_eq!(linked.child_post_id, Some(bobs_post));
    assert!(linked.items.is_empty());
    assert_eq!(linked.child_post.unwrap().title, "Vinyl Collection");

    let back = engine
        .update_offer(UpdateOfferCmd::new(offer.id, BOB).items(vec![item("Speakers")]))
        .await
        .unwrap();
    assert_eq!(back.child_post_id, None);
    assert_eq!(back.items.len(), 1);
}

#[tokio::test]
async fn update_offer_is_author_only() {
    let (engine, _db) = engine_with_db().await;
    let post_id = open_post(&engine, ALICE, "Bike").await;
    let offer = engine
        .create_offer(CreateOfferCmd::new(post_id, BOB))
        .await
        .unwrap();

    let err = engine
        .update_offer(UpdateOfferCmd::new(offer.id, CAROL).message("mine now"))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::Forbidden("not your offer".to_string()));
}

#[tokio::test]
async fn update_offer_requires_pending_status() {
    let (engine, _db) = engine_with_db().await;
    let post_id = open_post(&engine, ALICE, "Bike").await;
    let offer = engine
        .create_offer(CreateOfferCmd::new(post_id, BOB))
        .await
        .unwrap();
    engine.accept_offer(offer.id, ALICE).await.unwrap();

    let err = engine
        .update_offer(UpdateOfferCmd::new(offer.id, BOB).message("too late"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));
}

#[tokio::test]
async fn accept_settles_post_and_rejects_siblings() {
    let (engine, _db) = engine_with_db().await;
    let post_id = open_post(&engine, ALICE, "Guitar").await;
    let offer_a = engine
        .create_offer(CreateOfferCmd::new(post_id, BOB))
        .await
        .unwrap();
    let offer_b = engine
        .create_offer(CreateOfferCmd::new(post_id, CAROL))
        .await
        .unwrap();

    let trade = engine.accept_offer(offer_a.id, ALICE).await.unwrap();
    assert_eq!(trade.post_id, post_id);
    assert_eq!(trade.offer_id, offer_a.id);
    assert_eq!(trade.status, TradeStatus::Completed);

    let offer_a = engine.offer_by_id(offer_a.id).await.unwrap();
    let offer_b = engine.offer_by_id(offer_b.id).await.unwrap();
    assert_eq!(offer_a.status, OfferStatus::Accepted);
    assert_eq!(offer_b.status, OfferStatus::Rejected);
    assert_eq!(post_status(&engine, post_id).await, PostStatus::Traded);

    let trades = engine.trades_for_post(post_id).await.unwrap();
    assert_eq!(trades.len(), 1);

    // The force-rejected sibling is terminal; rejecting it again conflicts.
    let err = engine.reject_offer(offer_b.id, ALICE).await.unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));
}

#[tokio::test]
async fn accept_is_post_owner_only_and_leaves_state_unchanged() {
    let (engine, _db) = engine_with_db().await;
    let post_id = open_post(&engine, ALICE, "Guitar").await;
    let offer = engine
        .create_offer(CreateOfferCmd::new(post_id, BOB))
        .await
        .unwrap();

    let err = engine.accept_offer(offer.id, BOB).await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let offer = engine.offer_by_id(offer.id).await.unwrap();
    assert_eq!(offer.status, OfferStatus::Pending);
    assert_eq!(post_status(&engine, post_id).await, PostStatus::Open);
    assert!(engine.trades_for_post(post_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn accept_twice_conflicts_without_a_second_trade() {
    let (engine, _db) = engine_with_db().await;
    let post_id = open_post(&engine, ALICE, "Guitar").await;
    let offer = engine
        .create_offer(CreateOfferCmd::new(post_id, BOB))
        .await
        .unwrap();

    engine.accept_offer(offer.id, ALICE).await.unwrap();
    let err = engine.accept_offer(offer.id, ALICE).await.unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));

    assert_eq!(engine.trades_for_post(post_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn accept_with_child_post_closes_both_sides() {
    let (engine, _db) = engine_with_db().await;
    let parent = open_post(&engine, ALICE, "Guitar").await;
    let child = open_post(&engine, BOB, "Amplifier").await;

    // Carol has her own pending offer on Bob's listing.
    let carols = engine
        .create_offer(CreateOfferCmd::new(child, CAROL))
        .await
        .unwrap();

    let bobs = engine
        .create_offer(CreateOfferCmd::new(parent, BOB).child_post(child))
        .await
        .unwrap();

    let trade = engine.accept_offer(bobs.id, ALICE).await.unwrap();
    assert_eq!(trade.post_id, parent);

    assert_eq!(post_status(&engine, parent).await, PostStatus::Traded);
    assert_eq!(post_status(&engine, child).await, PostStatus::Traded);

    let carols = engine.offer_by_id(carols.id).await.unwrap();
    assert_eq!(carols.status, OfferStatus::Rejected);

    // The child post is closed but carries no trade row of its own.
    assert!(engine.trades_for_post(child).await.unwrap().is_empty());
}

#[tokio::test]
async fn reject_leaves_siblings_and_post_untouched() {
    let (engine, _db) = engine_with_db().await;
    let post_id = open_post(&engine, ALICE, "Guitar").await;
    let offer_a = engine
        .create_offer(CreateOfferCmd::new(post_id, BOB))
        .await
        .unwrap();
    let offer_b = engine
        .create_offer(CreateOfferCmd::new(post_id, CAROL))
        .await
        .unwrap();

    let rejected = engine.reject_offer(offer_b.id, ALICE).await.unwrap();
    assert_eq!(rejected.status, OfferStatus::Rejected);

    let offer_a = engine.offer_by_id(offer_a.id).await.unwrap();
    assert_eq!(offer_a.status, OfferStatus::Pending);
    assert_eq!(post_status(&engine, post_id).await, PostStatus::Open);
}

#[tokio::test]
async fn reject_is_post_owner_only() {
    let (engine, _db) = engine_with_db().await;
    let post_id = open_post(&engine, ALICE, "Guitar").await;
    let offer = engine
        .create_offer(CreateOfferCmd::new(post_id, BOB))
        .await
        .unwrap();

    let err = engine.reject_offer(offer.id, CAROL).await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn offer_by_id_absent_is_not_found() {
    let (engine, _db) = engine_with_db().await;
    let err = engine.offer_by_id(42).await.unwrap_err();
    assert_eq!(err, EngineError::NotFound("offer not found".to_string()));
}

#[tokio::test]
async fn list_offers_combines_filters() {
    let (engine, _db) = engine_with_db().await;
    let post_a = open_post(&engine, ALICE, "Guitar").await;
    let post_b = open_post(&engine, ALICE, "Amplifier").await;
    let bobs_post = open_post(&engine, BOB, "Pedalboard").await;

    let on_a = engine
        .create_offer(CreateOfferCmd::new(post_a, BOB))
        .await
        .unwrap();
    engine
        .create_offer(CreateOfferCmd::new(post_b, BOB))
        .await
        .unwrap();
    engine
        .create_offer(CreateOfferCmd::new(post_a, CAROL))
        .await
        .unwrap();
    let linked = engine
        .create_offer(CreateOfferCmd::new(post_b, BOB).child_post(bobs_post))
        .await
        .unwrap();

    let by_post = engine
        .list_offers(
            &OfferListFilter {
                post_id: Some(post_a),
                ..Default::default()
            },
            None,
            None,
        )
        .await
        .unwrap();
    assert_eq!(by_post.total, 2);

    let by_post_and_author = engine
        .list_offers(
            &OfferListFilter {
                post_id: Some(post_a),
                author_id: Some(BOB),
                ..Default::default()
            },
            None,
            None,
        )
        .await
        .unwrap();
    assert_eq!(by_post_and_author.total, 1);
    assert_eq!(by_post_and_author.offers[0].id, on_a.id);

    let by_child = engine
        .list_offers(
            &OfferListFilter {
                child_post_id: Some(bobs_post),
                ..Default::default()
            },
            None,
            None,
        )
        .await
        .unwrap();
    assert_eq!(by_child.total, 1);
    assert_eq!(by_child.offers[0].id, linked.id);

    engine.accept_offer(on_a.id, ALICE).await.unwrap();
    let accepted = engine
        .list_offers(
            &OfferListFilter {
                status: Some(OfferStatus::Accepted),
                ..Default::default()
            },
            None,
            None,
        )
        .await
        .unwrap();
    assert_eq!(accepted.total, 1);
    assert_eq!(accepted.offers[0].id, on_a.id);
}

#[tokio::test]
async fn list_offers_pages_are_disjoint_and_ordered() {
    let (engine, _db) = engine_with_db().await;
    let post_id = open_post(&engine, ALICE, "Guitar").await;
    for _ in 0..10 {
        engine
            .create_offer(CreateOfferCmd::new(post_id, BOB))
            .await
            .unwrap();
    }

    let filter = OfferListFilter {
        post_id: Some(post_id),
        ..Default::default()
    };
    let first = engine
        .list_offers(&filter, Some(5), Some(0))
        .await
        .unwrap();
    let second = engine
        .list_offers(&filter, Some(5), Some(5))
        .await
        .unwrap();

    assert_eq!(first.total, 10);
    assert_eq!(first.offers.len(), 5);
    assert_eq!(second.offers.len(), 5);

    let mut ids: Vec<i32> = first
        .offers
        .iter()
        .chain(second.offers.iter())
        .map(|offer| offer.id)
        .collect();
    // Newest first: (created_at desc, id desc) is id-descending here.
    let mut sorted = ids.clone();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(ids, sorted);
    ids.dedup();
    assert_eq!(ids.len(), 10);
}

#[tokio::test]
async fn list_offers_clamps_pagination() {
    let (engine, _db) = engine_with_db().await;
    let post_id = open_post(&engine, ALICE, "Guitar").await;
    engine
        .create_offer(CreateOfferCmd::new(post_id, BOB))
        .await
        .unwrap();

    let page = engine
        .list_offers(&OfferListFilter::default(), Some(0), None)
        .await
        .unwrap();
    assert_eq!(page.limit, 1);

    let page = engine
        .list_offers(&OfferListFilter::default(), Some(1000), None)
        .await
        .unwrap();
    assert_eq!(page.limit, 100);
}

#[tokio::test]
async fn consideration_is_items_or_child_post_never_both() {
    let (engine, _db) = engine_with_db().await;
    let post_id = open_post(&engine, ALICE, "Guitar").await;
    let bobs_post = open_post(&engine, BOB, "Amplifier").await;

    // The command builder makes the shapes mutually exclusive: setting a
    // child post discards previously set items.
    let cmd = CreateOfferCmd::new(post_id, BOB)
        .items(vec![item("Cables")])
        .child_post(bobs_post);
    assert!(matches!(cmd.consideration, Consideration::ChildPost(_)));

    let offer = engine.create_offer(cmd).await.unwrap();
    assert!(offer.items.is_empty());
    assert_eq!(offer.child_post_id, Some(bobs_post));
}
