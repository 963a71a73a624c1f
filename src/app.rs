//! Application state management for dexdash
//!
//! This module contains the main application state, handling keyboard input,
//! data loading through the market cache, and transitions between views.

use std::sync::Arc;

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent};
use tracing::{info, warn};

use dexdash::cache::CacheManager;
use dexdash::config::Config;
use dexdash::data::dashboard::{self, filter_by_token};
use dexdash::data::{load_snapshot, ApiError, CovalentClient, Market, MarketSnapshot, Table};

/// Cache of market snapshots keyed by `Market::cache_key`
pub type SnapshotCache = CacheManager<String, Arc<MarketSnapshot>>;

/// Application state enum representing the current view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    /// Initial loading state while the first market is fetched
    Loading,
    /// KPIs, charts and the pools table
    Dashboard,
    /// Latest transactions of one pool
    PoolTransactions,
}

/// Whether keystrokes edit the search box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
}

/// Work requested by a key press that needs the network
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    /// Load the current market, from cache when fresh
    LoadMarket,
    /// Drop the cached market and load it again
    ForceRefresh,
    /// Load transactions of a pool
    LoadTransactions { address: String, pair: String },
}

/// Transactions of the pool opened from the dashboard
#[derive(Debug, Clone)]
pub struct PoolView {
    pub address: String,
    pub pair: String,
    pub transactions: Table,
    pub selected_index: usize,
}

/// Main application struct managing state and data
pub struct App {
    /// Current application state/view
    pub state: AppState,
    /// Normal navigation or search editing
    pub input_mode: InputMode,
    /// Market being shown (or being loaded)
    pub market: Market,
    /// Last successfully loaded market data
    pub snapshot: Option<Arc<MarketSnapshot>>,
    /// Token filter typed after `/`
    pub search_query: String,
    /// Pools of the snapshot that match the search query
    pub visible_pools: Table,
    /// Index of the selected pool in `visible_pools`
    pub selected_index: usize,
    /// Open pool transactions, if any
    pub pool_view: Option<PoolView>,
    /// One-line status shown in the footer
    pub status: Option<String>,
    /// Timestamp of last successful load
    pub last_refresh: Option<DateTime<Local>>,
    /// Network work to run after the current key press
    pub pending: Option<PendingAction>,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Flag to show help overlay
    pub show_help: bool,
    client: CovalentClient,
    cache: Arc<SnapshotCache>,
}

impl App {
    /// Creates an App for `config.market` with an empty cache
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let client = CovalentClient::new(config.api.clone())?;
        let cache = Arc::new(SnapshotCache::new(config.cache_ttl));
        Ok(Self::with_client(client, cache, config.market))
    }

    /// Creates an App around an existing client and cache
    pub fn with_client(client: CovalentClient, cache: Arc<SnapshotCache>, market: Market) -> Self {
        Self {
            state: AppState::Loading,
            input_mode: InputMode::Normal,
            market,
            snapshot: None,
            search_query: String::new(),
            visible_pools: Table::default(),
            selected_index: 0,
            pool_view: None,
            status: None,
            last_refresh: None,
            pending: None,
            should_quit: false,
            show_help: false,
            client,
            cache,
        }
    }

    /// The snapshot cache shared with background maintenance
    pub fn cache(&self) -> &Arc<SnapshotCache> {
        &self.cache
    }

    /// Number of pools currently listed
    pub fn pool_count(&self) -> usize {
        self.visible_pools.len()
    }

    /// Address and pair label of the selected pool
    pub fn selected_pool(&self) -> Option<(String, String)> {
        if self.selected_index >= self.visible_pools.len() {
            return None;
        }
        let address = self.visible_pools.cell_text(self.selected_index, "exchange");
        if address.is_empty() {
            return None;
        }
        let pair = self.visible_pools.cell_text(self.selected_index, "pair");
        Some((address, pair))
    }

    /// Loads the current market through the cache
    ///
    /// A fresh cached snapshot is used as-is. On failure the previous
    /// snapshot stays on screen and the status line reports that no update
    /// happened.
    pub async fn load_market(&mut self) {
        let market = self.market;
        let key = market.cache_key();
        let client = &self.client;
        let result = self
            .cache
            .get_or_refresh(&key, |_| async move {
                load_snapshot(client, market).await.map(Arc::new)
            })
            .await;

        match result {
            Ok(snapshot) => {
                info!(%market, pools = snapshot.pools.len(), "market loaded");
                self.apply_snapshot(snapshot);
            }
            Err(err) => {
                warn!(%market, error = %err, "market load failed");
                if let Some(previous) = &self.snapshot {
                    self.market = previous.market;
                }
                self.status = Some(format!("No update for {}: {}", market, err));
            }
        }

        if self.state == AppState::Loading {
            self.state = AppState::Dashboard;
        }
    }

    /// Drops the cached snapshot of the current market and loads it again
    pub async fn force_refresh(&mut self) {
        self.cache.delete(&self.market.cache_key());
        self.load_market().await;
    }

    /// Loads the transactions of one pool and opens the transactions view
    pub async fn load_transactions(&mut self, address: String, pair: String) {
        match dashboard::load_transactions(&self.client, self.market, &address).await {
            Ok(transactions) => {
                info!(pool = %address, count = transactions.len(), "pool transactions loaded");
                self.pool_view = Some(PoolView {
                    address,
                    pair,
                    transactions,
                    selected_index: 0,
                });
                self.status = None;
                self.state = AppState::PoolTransactions;
            }
            Err(err) => {
                warn!(pool = %address, error = %err, "pool transactions failed");
                self.status = Some(format!("No transactions for {}: {}", pair, err));
            }
        }
    }

    /// Runs the action queued by the last key press, if any
    pub async fn run_pending(&mut self) {
        match self.pending.take() {
            Some(PendingAction::LoadMarket) => self.load_market().await,
            Some(PendingAction::ForceRefresh) => self.force_refresh().await,
            Some(PendingAction::LoadTransactions { address, pair }) => {
                self.load_transactions(address, pair).await
            }
            None => {}
        }
    }

    fn apply_snapshot(&mut self, snapshot: Arc<MarketSnapshot>) {
        self.market = snapshot.market;
        self.last_refresh = Some(snapshot.fetched_at.with_timezone(&Local));
        self.snapshot = Some(snapshot);
        self.status = None;
        self.apply_filter();
    }

    /// Recomputes the visible pools from the snapshot and search query
    fn apply_filter(&mut self) {
        self.visible_pools = match &self.snapshot {
            Some(snapshot) => filter_by_token(&snapshot.pools, &self.search_query),
            None => Table::default(),
        };
        if self.selected_index >= self.visible_pools.len() {
            self.selected_index = 0;
        }
    }

    fn request_market(&mut self, market: Market) {
        self.market = market;
        self.status = Some(format!("Loading {}...", market));
        self.pending = Some(PendingAction::LoadMarket);
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// - `q`: Quit the application
    /// - `Up`/`k`, `Down`/`j`: Move selection
    /// - `c`: Next chain, `x`: Next exchange
    /// - `/`: Search pools by token (Enter keeps, Esc clears)
    /// - `Enter`: Open transactions of the selected pool
    /// - `r`: Refresh, bypassing the cache
    /// - `Esc`: Clear the search, go back, or quit
    /// - `?`: Help
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Handle help overlay - intercepts all keys when shown
        if self.show_help {
            match key_event.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    self.show_help = false;
                }
                _ => {}
            }
            return;
        }

        if self.input_mode == InputMode::Search {
            self.handle_search_key(key_event);
            return;
        }

        match self.state {
            AppState::Loading => {
                if key_event.code == KeyCode::Char('q') {
                    self.should_quit = true;
                }
            }
            AppState::Dashboard => match key_event.code {
                KeyCode::Char('q') => {
                    self.should_quit = true;
                }
                KeyCode::Esc => {
                    if self.search_query.is_empty() {
                        self.should_quit = true;
                    } else {
                        self.search_query.clear();
                        self.apply_filter();
                    }
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.move_selection_up();
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.move_selection_down();
                }
                KeyCode::Char('c') => {
                    let chain = self.market.chain.next_on_dashboard();
                    self.request_market(Market::new(chain, self.market.exchange));
                }
                KeyCode::Char('x') => {
                    let exchange = self.market.exchange.next();
                    self.request_market(Market::new(self.market.chain, exchange));
                }
                KeyCode::Char('/') => {
                    self.input_mode = InputMode::Search;
                }
                KeyCode::Enter => {
                    if let Some((address, pair)) = self.selected_pool() {
                        self.status = Some(format!("Loading transactions for {}...", pair));
                        self.pending = Some(PendingAction::LoadTransactions { address, pair });
                    }
                }
                KeyCode::Char('r') => {
                    self.status = Some(format!("Refreshing {}...", self.market));
                    self.pending = Some(PendingAction::ForceRefresh);
                }
                KeyCode::Char('?') => {
                    self.show_help = true;
                }
                _ => {}
            },
            AppState::PoolTransactions => match key_event.code {
                KeyCode::Char('q') => {
                    self.should_quit = true;
                }
                KeyCode::Esc | KeyCode::Backspace => {
                    self.state = AppState::Dashboard;
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    if let Some(view) = &mut self.pool_view {
                        view.selected_index = wrap_up(view.selected_index, view.transactions.len());
                    }
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    if let Some(view) = &mut self.pool_view {
                        view.selected_index =
                            wrap_down(view.selected_index, view.transactions.len());
                    }
                }
                KeyCode::Char('r') => {
                    if let Some(view) = &self.pool_view {
                        self.pending = Some(PendingAction::LoadTransactions {
                            address: view.address.clone(),
                            pair: view.pair.clone(),
                        });
                    }
                }
                KeyCode::Char('?') => {
                    self.show_help = true;
                }
                _ => {}
            },
        }
    }

    fn handle_search_key(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Esc => {
                self.search_query.clear();
                self.input_mode = InputMode::Normal;
                self.apply_filter();
            }
            KeyCode::Backspace => {
                self.search_query.pop();
                self.apply_filter();
            }
            KeyCode::Char(c) => {
                self.search_query.push(c);
                self.apply_filter();
            }
            _ => {}
        }
    }

    /// Moves the selection up in the list, wrapping to bottom if at top
    fn move_selection_up(&mut self) {
        self.selected_index = wrap_up(self.selected_index, self.pool_count());
    }

    /// Moves the selection down in the list, wrapping to top if at bottom
    fn move_selection_down(&mut self) {
        self.selected_index = wrap_down(self.selected_index, self.pool_count());
    }
}

fn wrap_up(index: usize, count: usize) -> usize {
    if count == 0 {
        0
    } else if index == 0 {
        count - 1
    } else {
        index - 1
    }
}

fn wrap_down(index: usize, count: usize) -> usize {
    if count == 0 {
        0
    } else {
        (index + 1) % count
    }
}
