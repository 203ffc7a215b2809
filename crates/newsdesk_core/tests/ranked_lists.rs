use chrono::NaiveDate;
use newsdesk_core::db::open_db;
use newsdesk_core::{
    ContentItem, ContentListQuery, ContentRepository, FeaturedContent, ItemId, ListKind,
    RankedEntry, RankedListManager, RankingError, RankingRepository, RepoError, RepoResult,
    SlotWrite, SqliteStore,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn published() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
}

fn seed(store: &impl ContentRepository, count: usize) -> Vec<ItemId> {
    (0..count)
        .map(|index| {
            let item = ContentItem::new(format!("Story {index}"), "wire", "local", published());
            store.create_item(&item).unwrap()
        })
        .collect()
}

fn setup(count: usize) -> (Arc<SqliteStore>, FeaturedContent<SqliteStore>, Vec<ItemId>) {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let ids = seed(store.as_ref(), count);
    let featured = FeaturedContent::open(Arc::clone(&store)).unwrap();
    (store, featured, ids)
}

fn order(featured: &FeaturedContent<SqliteStore>, kind: ListKind) -> Vec<ItemId> {
    featured
        .list(kind)
        .into_iter()
        .map(|entry| entry.item_id)
        .collect()
}

fn assert_contiguous(entries: &[RankedEntry]) {
    for (index, entry) in entries.iter().enumerate() {
        assert_eq!(entry.rank as usize, index + 1);
    }
}

#[test]
fn assign_past_occupied_run_lands_on_first_free_rank() {
    let (_store, featured, ids) = setup(3);
    let (a, b, c) = (ids[0], ids[1], ids[2]);

    assert_eq!(featured.assign(ListKind::TopNews, a, 5).unwrap(), 1);
    assert_eq!(featured.assign(ListKind::TopNews, b, 5).unwrap(), 2);
    assert_eq!(featured.assign(ListKind::TopNews, c, 1).unwrap(), 1);

    assert_eq!(order(&featured, ListKind::TopNews), vec![c, a, b]);
    assert_contiguous(&featured.list(ListKind::TopNews));
}

#[test]
fn assign_inside_run_shifts_members_down() {
    let (_store, featured, ids) = setup(4);
    for id in &ids[..3] {
        featured.auto_assign(ListKind::TopNews, *id).unwrap();
    }

    assert_eq!(featured.assign(ListKind::TopNews, ids[3], 2).unwrap(), 2);

    assert_eq!(
        order(&featured, ListKind::TopNews),
        vec![ids[0], ids[3], ids[1], ids[2]]
    );
}

#[test]
fn assign_rank_one_on_full_list_evicts_last_member() {
    let (store, featured, ids) = setup(21);
    for id in &ids[..20] {
        featured.auto_assign(ListKind::TopNews, *id).unwrap();
    }
    let last = ids[19];

    featured.assign(ListKind::TopNews, ids[20], 1).unwrap();

    let entries = featured.list(ListKind::TopNews);
    assert_eq!(entries.len(), 20);
    assert_contiguous(&entries);
    assert_eq!(entries[0].item_id, ids[20]);
    assert_eq!(entries[1].item_id, ids[0]);
    assert_eq!(entries[19].item_id, ids[18]);

    let evicted = store.membership(ListKind::TopNews, last).unwrap().unwrap();
    assert!(!evicted.is_member);
    assert_eq!(evicted.rank, None);
}

#[test]
fn reassigning_same_rank_is_a_no_op() {
    let (store, featured, ids) = setup(3);
    for id in &ids {
        featured.auto_assign(ListKind::Trending, *id).unwrap();
    }
    let before = store.list_members(ListKind::Trending).unwrap();

    assert_eq!(featured.assign(ListKind::Trending, ids[1], 2).unwrap(), 2);

    assert_eq!(store.list_members(ListKind::Trending).unwrap(), before);
    assert_eq!(featured.list(ListKind::Trending), before);
}

#[test]
fn assign_moves_existing_member_without_duplicating() {
    let (_store, featured, ids) = setup(4);
    for id in &ids {
        featured.auto_assign(ListKind::TopNews, *id).unwrap();
    }

    featured.assign(ListKind::TopNews, ids[3], 1).unwrap();
    assert_eq!(
        order(&featured, ListKind::TopNews),
        vec![ids[3], ids[0], ids[1], ids[2]]
    );

    featured.assign(ListKind::TopNews, ids[3], 4).unwrap();
    assert_eq!(order(&featured, ListKind::TopNews), ids);
}

#[test]
fn auto_assign_fills_lowest_free_rank_then_evicts_at_capacity() {
    let (_store, featured, ids) = setup(31);

    for (index, id) in ids[..30].iter().enumerate() {
        let rank = featured.auto_assign(ListKind::Trending, *id).unwrap();
        assert_eq!(rank as usize, index + 1);
    }
    assert_eq!(featured.auto_assign(ListKind::Trending, ids[5]).unwrap(), 6);

    assert_eq!(featured.auto_assign(ListKind::Trending, ids[30]).unwrap(), 30);
    let entries = featured.list(ListKind::Trending);
    assert_eq!(entries.len(), 30);
    assert_contiguous(&entries);
    assert_eq!(entries[29].item_id, ids[30]);
    assert_eq!(featured.list_manager(ListKind::Trending).rank_of(ids[29]), None);
}

#[test]
fn remove_compacts_ranks_and_keeps_cleared_row() {
    let (store, featured, ids) = setup(4);
    for id in &ids {
        featured.auto_assign(ListKind::TopNews, *id).unwrap();
    }

    featured.remove(ListKind::TopNews, ids[1]).unwrap();

    assert_eq!(
        order(&featured, ListKind::TopNews),
        vec![ids[0], ids[2], ids[3]]
    );
    assert_contiguous(&store.list_members(ListKind::TopNews).unwrap());
    let cleared = store.membership(ListKind::TopNews, ids[1]).unwrap().unwrap();
    assert!(!cleared.is_member);
    assert_eq!(cleared.rank, None);

    featured.remove(ListKind::TopNews, ids[1]).unwrap();
    assert_eq!(featured.list(ListKind::TopNews).len(), 3);
}

#[test]
fn out_of_range_rank_is_rejected_without_mutation() {
    let (store, featured, ids) = setup(2);
    featured.auto_assign(ListKind::TopNews, ids[0]).unwrap();

    for rank in [0, 21] {
        match featured.assign(ListKind::TopNews, ids[1], rank) {
            Err(RankingError::InvalidRank {
                kind,
                rank: rejected,
                capacity,
            }) => {
                assert_eq!(kind, ListKind::TopNews);
                assert_eq!(rejected, rank);
                assert_eq!(capacity, 20);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    assert!(featured.assign(ListKind::Trending, ids[1], 30).is_ok());
    assert_eq!(order(&featured, ListKind::TopNews), vec![ids[0]]);
    assert_eq!(store.membership(ListKind::TopNews, ids[1]).unwrap(), None);
}

#[test]
fn unknown_item_is_not_found() {
    let (_store, featured, _ids) = setup(1);
    let ghost = uuid::Uuid::new_v4();

    assert!(matches!(
        featured.assign(ListKind::TopNews, ghost, 1),
        Err(RankingError::NotFound(id)) if id == ghost
    ));
    assert!(matches!(
        featured.auto_assign(ListKind::Trending, ghost),
        Err(RankingError::NotFound(_))
    ));
    assert!(matches!(
        featured.remove(ListKind::TopNews, ghost),
        Err(RankingError::NotFound(_))
    ));
    assert!(featured.list(ListKind::TopNews).is_empty());
}

#[test]
fn list_kinds_are_independent() {
    let (_store, featured, ids) = setup(3);
    featured.auto_assign(ListKind::TopNews, ids[0]).unwrap();
    featured.auto_assign(ListKind::TopNews, ids[1]).unwrap();
    featured.auto_assign(ListKind::Trending, ids[1]).unwrap();
    featured.auto_assign(ListKind::Trending, ids[2]).unwrap();

    featured.remove(ListKind::TopNews, ids[1]).unwrap();

    assert_eq!(order(&featured, ListKind::TopNews), vec![ids[0]]);
    assert_eq!(order(&featured, ListKind::Trending), vec![ids[1], ids[2]]);
}

#[test]
fn rankings_survive_reopen_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("newsdesk.db");

    let ids = {
        let store = Arc::new(SqliteStore::open(&path).unwrap());
        let ids = seed(store.as_ref(), 3);
        let featured = FeaturedContent::open(Arc::clone(&store)).unwrap();
        featured.auto_assign(ListKind::TopNews, ids[0]).unwrap();
        featured.auto_assign(ListKind::TopNews, ids[1]).unwrap();
        featured.assign(ListKind::TopNews, ids[2], 1).unwrap();
        ids
    };

    let reopened = FeaturedContent::open(Arc::new(SqliteStore::open(&path).unwrap())).unwrap();
    assert_eq!(
        order(&reopened, ListKind::TopNews),
        vec![ids[2], ids[0], ids[1]]
    );
    assert!(reopened.list(ListKind::Trending).is_empty());
}

#[test]
fn opening_gapped_ranking_reports_corruption() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gapped.db");
    let conn = open_db(&path).unwrap();
    conn.execute_batch(
        "INSERT INTO content_items (item_id, headline, source, category, published_on)
         VALUES ('6f1c1b2e-8a51-4d6a-9a0f-2d4f7e3c1a01', 'A', 'wire', 'local', '2024-03-01'),
                ('6f1c1b2e-8a51-4d6a-9a0f-2d4f7e3c1a02', 'B', 'wire', 'local', '2024-03-01');
         INSERT INTO ranked_slots (list_kind, item_id, is_member, rank)
         VALUES ('top_news', '6f1c1b2e-8a51-4d6a-9a0f-2d4f7e3c1a01', 1, 1),
                ('top_news', '6f1c1b2e-8a51-4d6a-9a0f-2d4f7e3c1a02', 1, 3);",
    )
    .unwrap();
    drop(conn);

    let store = Arc::new(SqliteStore::open(&path).unwrap());
    match RankedListManager::open(ListKind::TopNews, Arc::clone(&store)) {
        Err(RankingError::CorruptRanking { kind, .. }) => assert_eq!(kind, ListKind::TopNews),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("gapped ranking must not open"),
    }
    assert!(RankedListManager::open(ListKind::Trending, store).is_ok());
}

#[test]
fn failed_slot_batch_rolls_back_every_write() {
    let store = SqliteStore::open_in_memory().unwrap();
    let ids = seed(&store, 3);
    store
        .apply_slot_writes(
            ListKind::TopNews,
            &[SlotWrite::Place {
                item_id: ids[0],
                rank: 1,
            }],
        )
        .unwrap();

    let result = store.apply_slot_writes(
        ListKind::TopNews,
        &[
            SlotWrite::Place {
                item_id: ids[1],
                rank: 2,
            },
            SlotWrite::Place {
                item_id: ids[2],
                rank: 1,
            },
        ],
    );

    assert!(result.is_err());
    let members = store.list_members(ListKind::TopNews).unwrap();
    assert_eq!(
        members,
        vec![RankedEntry {
            item_id: ids[0],
            rank: 1
        }]
    );
    assert_eq!(store.membership(ListKind::TopNews, ids[1]).unwrap(), None);
}

/// Store double whose slot commits can be switched to fail.
struct FlakyStore {
    inner: SqliteStore,
    fail_commits: AtomicBool,
}

impl FlakyStore {
    fn new() -> Self {
        Self {
            inner: SqliteStore::open_in_memory().unwrap(),
            fail_commits: AtomicBool::new(false),
        }
    }
}

impl RankingRepository for FlakyStore {
    fn list_members(&self, kind: ListKind) -> RepoResult<Vec<RankedEntry>> {
        self.inner.list_members(kind)
    }

    fn membership(
        &self,
        kind: ListKind,
        item_id: ItemId,
    ) -> RepoResult<Option<newsdesk_core::RankedItem>> {
        self.inner.membership(kind, item_id)
    }

    fn apply_slot_writes(&self, kind: ListKind, writes: &[SlotWrite]) -> RepoResult<()> {
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(RepoError::InvalidData("injected commit failure".to_string()));
        }
        self.inner.apply_slot_writes(kind, writes)
    }
}

impl ContentRepository for FlakyStore {
    fn create_item(&self, item: &ContentItem) -> RepoResult<ItemId> {
        self.inner.create_item(item)
    }

    fn update_item(&self, item: &ContentItem) -> RepoResult<()> {
        self.inner.update_item(item)
    }

    fn get_item(&self, item_id: ItemId) -> RepoResult<Option<ContentItem>> {
        self.inner.get_item(item_id)
    }

    fn item_exists(&self, item_id: ItemId) -> RepoResult<bool> {
        self.inner.item_exists(item_id)
    }

    fn list_items(&self, query: &ContentListQuery) -> RepoResult<Vec<ContentItem>> {
        self.inner.list_items(query)
    }

    fn count_items(&self) -> RepoResult<u64> {
        self.inner.count_items()
    }
}

#[test]
fn store_failure_leaves_memory_and_storage_unchanged() {
    let store = Arc::new(FlakyStore::new());
    let ids = seed(store.as_ref(), 4);
    let manager = RankedListManager::open(ListKind::TopNews, Arc::clone(&store)).unwrap();
    for id in &ids[..3] {
        manager.auto_assign(*id).unwrap();
    }
    let before = manager.list();

    store.fail_commits.store(true, Ordering::SeqCst);
    assert!(matches!(
        manager.assign(ids[3], 1),
        Err(RankingError::Store(_))
    ));
    assert!(matches!(
        manager.remove(ids[0]),
        Err(RankingError::Store(_))
    ));
    assert_eq!(manager.list(), before);
    assert_eq!(store.list_members(ListKind::TopNews).unwrap(), before);

    store.fail_commits.store(false, Ordering::SeqCst);
    assert_eq!(manager.assign(ids[3], 1).unwrap(), 1);
    assert_eq!(manager.len(), 4);
    assert_contiguous(&store.list_members(ListKind::TopNews).unwrap());
}
