//! Interactive selection over ranked candidates
//!
//! `Selection` holds no terminal or network handle. The runner feeds it
//! [`Action`]s and acts on the returned [`Outcome`]: draw and wait for the
//! next key, fetch comments, or stop with a [`SelectionResult`].
//!
//! Candidates live in a stable arena in their ranked order; every ordering
//! and every page is a list of indices into it.

use tracing::debug;

use crate::markup::{highlight, Fragment};
use crate::metadata::Tags;
use crate::paginate::{paginate, Page};
use crate::scoring::by_relevance;
use crate::subdivx::{Candidate, Comment};

/// Operator intent, decoded from a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    SortDateAsc,
    SortDateDesc,
    DefaultOrder,
    Enter,
    ShowDescription,
    ShowComments,
    Back,
    Download,
    Exit,
    Interrupt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Browse,
    Description,
    Comments,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Default,
    DateAsc,
    DateDesc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionResult {
    Selected(u64),
    /// Exit key: skip this search
    Cancelled,
    /// Ctrl+C: stop everything
    Interrupted,
}

/// What the runner does next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    /// Load comments for this id, then call [`Selection::comments_loaded`]
    FetchComments(u64),
    Done(SelectionResult),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    NoComments,
    LoadFailed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommentsStatus {
    Loading,
    Empty(EmptyReason),
    Loaded {
        comments: Vec<Comment>,
        pages: Page<Comment>,
        page: usize,
    },
}

/// Drill-down screen over the results table
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Description { index: usize, fragments: Vec<Fragment> },
    Comments { index: usize, status: CommentsStatus },
}

impl View {
    fn index(&self) -> usize {
        match self {
            View::Description { index, .. } | View::Comments { index, .. } => *index,
        }
    }
}

#[derive(Debug)]
pub struct Selection {
    candidates: Vec<Candidate>,
    tags: Tags,
    order: Vec<usize>,
    sort: SortOrder,
    page: Page<usize>,
    page_index: usize,
    row: usize,
    comments_page_size: usize,
    stack: Vec<View>,
    result: Option<SelectionResult>,
}

impl Selection {
    pub fn new(candidates: Vec<Candidate>, tags: Tags, page_size: usize, comments_page_size: usize) -> Self {
        let order: Vec<usize> = (0..candidates.len()).collect();
        let page = paginate(&order, page_size);

        Self {
            candidates,
            tags,
            order,
            sort: SortOrder::Default,
            page,
            page_index: 0,
            row: 0,
            comments_page_size: comments_page_size.max(1),
            stack: Vec::new(),
            result: None,
        }
    }

    pub fn screen(&self) -> Screen {
        match self.stack.last() {
            None => Screen::Browse,
            Some(View::Description { .. }) => Screen::Description,
            Some(View::Comments { .. }) => Screen::Comments,
        }
    }

    pub fn view(&self) -> Option<&View> {
        self.stack.last()
    }

    pub fn result(&self) -> Option<SelectionResult> {
        self.result
    }

    pub fn total(&self) -> usize {
        self.candidates.len()
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_count(&self) -> usize {
        self.page.page_count
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort
    }

    pub fn candidate(&self, index: usize) -> Option<&Candidate> {
        self.candidates.get(index)
    }

    /// Rows on the current page as `(absolute position, candidate)`
    pub fn page_rows(&self) -> impl Iterator<Item = (usize, &Candidate)> + '_ {
        let start = self.page.absolute(self.page_index, 0);
        self.page
            .rows(self.page_index)
            .iter()
            .enumerate()
            .map(move |(row, &index)| (start + row, &self.candidates[index]))
    }

    /// Arena index of the highlighted row
    fn highlighted_index(&self) -> Option<usize> {
        self.page.rows(self.page_index).get(self.row).copied()
    }

    pub fn highlighted(&self) -> Option<&Candidate> {
        self.highlighted_index().map(|i| &self.candidates[i])
    }

    /// Apply one action.
    ///
    /// Once terminated, every further action reports the same result.
    pub fn handle(&mut self, action: Action) -> Outcome {
        if let Some(result) = self.result {
            return Outcome::Done(result);
        }
        if action == Action::Interrupt {
            return self.finish(SelectionResult::Interrupted);
        }

        match self.screen() {
            Screen::Browse => self.handle_browse(action),
            Screen::Description => self.handle_description(action),
            Screen::Comments => self.handle_comments(action),
        }
    }

    fn handle_browse(&mut self, action: Action) -> Outcome {
        match action {
            Action::Up => {
                self.row = self.row.saturating_sub(1);
            }
            Action::Down => {
                let rows = self.page.rows(self.page_index).len();
                self.row = (self.row + 1).min(rows.saturating_sub(1));
            }
            Action::Left => {
                if self.page_index > 0 {
                    self.page_index -= 1;
                    self.row = 0;
                }
            }
            Action::Right => {
                if self.page_index + 1 < self.page.page_count {
                    self.page_index += 1;
                    self.row = 0;
                }
            }
            Action::SortDateAsc => self.reorder(SortOrder::DateAsc),
            Action::SortDateDesc => self.reorder(SortOrder::DateDesc),
            Action::DefaultOrder => self.reorder(SortOrder::Default),
            Action::Enter => {
                if let Some(index) = self.highlighted_index() {
                    let id = self.candidates[index].id;
                    return self.finish(SelectionResult::Selected(id));
                }
            }
            Action::ShowDescription => {
                if let Some(index) = self.highlighted_index() {
                    let text = self.candidates[index].description_text();
                    let fragments = highlight(&text, &self.tags);
                    self.stack.push(View::Description { index, fragments });
                }
            }
            Action::ShowComments => {
                if let Some(index) = self.highlighted_index() {
                    let candidate = &self.candidates[index];
                    if candidate.comment_count == 0 {
                        self.stack.push(View::Comments {
                            index,
                            status: CommentsStatus::Empty(EmptyReason::NoComments),
                        });
                    } else {
                        let id = candidate.id;
                        self.stack.push(View::Comments { index, status: CommentsStatus::Loading });
                        return Outcome::FetchComments(id);
                    }
                }
            }
            Action::Exit => return self.finish(SelectionResult::Cancelled),
            _ => {}
        }
        Outcome::Continue
    }

    fn handle_description(&mut self, action: Action) -> Outcome {
        match action {
            Action::Back => {
                self.stack.pop();
                Outcome::Continue
            }
            Action::Download => self.download_from_view(),
            _ => Outcome::Continue,
        }
    }

    fn handle_comments(&mut self, action: Action) -> Outcome {
        match action {
            Action::Back => {
                self.stack.pop();
            }
            Action::Download => return self.download_from_view(),
            Action::Left | Action::Right => {
                if let Some(View::Comments {
                    status: CommentsStatus::Loaded { pages, page, .. },
                    ..
                }) = self.stack.last_mut()
                {
                    if action == Action::Left {
                        *page = page.saturating_sub(1);
                    } else if *page + 1 < pages.page_count {
                        *page += 1;
                    }
                }
            }
            _ => {}
        }
        Outcome::Continue
    }

    fn download_from_view(&mut self) -> Outcome {
        match self.stack.last().map(View::index) {
            Some(index) => {
                let id = self.candidates[index].id;
                self.finish(SelectionResult::Selected(id))
            }
            None => Outcome::Continue,
        }
    }

    fn finish(&mut self, result: SelectionResult) -> Outcome {
        debug!("Selection finished: {:?}", result);
        self.stack.clear();
        self.result = Some(result);
        Outcome::Done(result)
    }

    /// Deliver the comments requested by [`Outcome::FetchComments`].
    ///
    /// Ignored unless the comments screen is still waiting for them.
    pub fn comments_loaded(&mut self, comments: Option<Vec<Comment>>) {
        let page_size = self.comments_page_size;
        if let Some(View::Comments { status, .. }) = self.stack.last_mut() {
            if *status != CommentsStatus::Loading {
                return;
            }
            *status = match comments {
                None => CommentsStatus::Empty(EmptyReason::LoadFailed),
                Some(comments) if comments.is_empty() => CommentsStatus::Empty(EmptyReason::NoComments),
                Some(comments) => CommentsStatus::Loaded {
                    pages: paginate(&comments, page_size),
                    comments,
                    page: 0,
                },
            };
        }
    }

    /// Re-paginate results and comments for a new row budget.
    ///
    /// The highlighted result stays highlighted.
    pub fn resize(&mut self, page_size: usize, comments_page_size: usize) {
        let absolute = self.page.absolute(self.page_index, self.row);
        self.page = paginate(&self.order, page_size);
        if self.page.is_empty() {
            self.page_index = 0;
            self.row = 0;
        } else {
            let absolute = absolute.min(self.page.total - 1);
            self.page_index = absolute / self.page.page_size;
            self.row = absolute % self.page.page_size;
        }

        self.comments_page_size = comments_page_size.max(1);
        let page_size = self.comments_page_size;
        for view in &mut self.stack {
            if let View::Comments {
                status: CommentsStatus::Loaded { comments, pages, page },
                ..
            } = view
            {
                *pages = paginate(comments, page_size);
                *page = (*page).min(pages.page_count.saturating_sub(1));
            }
        }
    }

    /// Rebuild the ordering and start over at the first row
    fn reorder(&mut self, sort: SortOrder) {
        let candidates = &self.candidates;
        let mut order: Vec<usize> = (0..candidates.len()).collect();
        match sort {
            SortOrder::Default => order.sort_by(|&a, &b| by_relevance(&candidates[a], &candidates[b])),
            // `None` orders before any date, so unknown uploads count as earliest
            SortOrder::DateAsc => order.sort_by_key(|&i| candidates[i].uploaded_at),
            SortOrder::DateDesc => {
                order.sort_by(|&a, &b| candidates[b].uploaded_at.cmp(&candidates[a].uploaded_at))
            }
        }

        debug!("Reordered {} results: {:?}", order.len(), sort);
        self.page = paginate(&order, self.page.page_size);
        self.order = order;
        self.sort = sort;
        self.page_index = 0;
        self.row = 0;
    }
}
