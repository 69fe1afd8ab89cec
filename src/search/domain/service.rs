use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::books::dto::BookDto;
use crate::books::repository::BookRepository;
use crate::core::domain::CirculationLock;
use crate::core::library::{LibraryResult, SearchKind};
use crate::patrons::domain::PatronService;
use crate::search::domain::SearchService;

// recommendations stop at the five most popular unread books
const RECOMMEND_LIMIT: usize = 5;

pub struct SearchServiceImpl {
    book_repository: Arc<dyn BookRepository>,
    patron_service: Arc<dyn PatronService>,
    lock: CirculationLock,
}

impl SearchServiceImpl {
    pub fn new(book_repository: Arc<dyn BookRepository>,
               patron_service: Arc<dyn PatronService>, lock: CirculationLock) -> Self {
        Self {
            book_repository,
            patron_service,
            lock,
        }
    }

    async fn books_snapshot(&self) -> LibraryResult<Vec<BookDto>> {
        let res = self.book_repository.find_all().await?;
        Ok(res.iter().map(BookDto::from).collect())
    }

    // Stable sort: equal borrow counts keep catalog insertion order.
    fn rank_by_popularity(books: &mut [BookDto]) {
        books.sort_by(|a, b| b.times_borrowed.cmp(&a.times_borrowed));
    }
}

// title/author match case-insensitively on substrings; isbn is exact
fn matches(kind: SearchKind, book: &BookDto, query: &str) -> bool {
    match kind {
        SearchKind::ByTitle => book.title.to_lowercase().contains(query.to_lowercase().as_str()),
        SearchKind::ByAuthor => book.author.to_lowercase().contains(query.to_lowercase().as_str()),
        SearchKind::ByIsbn => book.isbn == query,
    }
}

#[async_trait]
impl SearchService for SearchServiceImpl {
    async fn search(&self, kind: SearchKind, query: &str) -> LibraryResult<Vec<BookDto>> {
        if query.trim().is_empty() {
            return Ok(vec![]);
        }
        let _guard = self.lock.shared().await;
        let books = self.books_snapshot().await?;
        Ok(books.into_iter()
            .filter(|book| matches(kind, book, query))
            .collect())
    }

    async fn recommend(&self, patron_id: &str) -> LibraryResult<Vec<BookDto>> {
        let _guard = self.lock.shared().await;
        let patron = self.patron_service.find_patron_by_id(patron_id).await?;
        let history: HashSet<String> = patron.history_isbns.iter().cloned().collect();
        let mut unread: Vec<BookDto> = self.books_snapshot().await?
            .into_iter()
            .filter(|book| !history.contains(&book.isbn))
            .collect();
        Self::rank_by_popularity(&mut unread);
        unread.truncate(RECOMMEND_LIMIT);
        Ok(unread)
    }

    async fn most_borrowed(&self, limit: usize) -> LibraryResult<Vec<BookDto>> {
        let _guard = self.lock.shared().await;
        let mut books = self.books_snapshot().await?;
        Self::rank_by_popularity(&mut books);
        books.truncate(limit);
        Ok(books)
    }
}
