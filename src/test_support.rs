//! テスト用のインメモリ `PageDriver`
//!
//! ページの列を持ち、「次へ」のクリックで次のページへ切り替わる。
//! 時刻は `tokio::time::Instant` を使うので `start_paused` のテストで決定的に動く。

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::blog::types::{ControlState, RawAnchor, RawGroup};
use crate::config::ArticleSelectors;
use crate::error::ScraperError;
use crate::traits::PageDriver;

#[derive(Debug, Clone)]
struct MockPageData {
    url: String,
    titles: Vec<RawAnchor>,
    descriptions: Vec<String>,
    dates: Vec<String>,
    groups: Option<Vec<RawGroup>>,
    next: Option<ControlState>,
    click_advances: bool,
    navigation_delay: Duration,
    failing: bool,
}

#[derive(Debug)]
struct MockState {
    current: usize,
    pending: Option<(Instant, usize)>,
    clicks: usize,
    first_text_calls: usize,
    visited: Vec<String>,
}

pub struct MockPage {
    pages: Vec<MockPageData>,
    selectors: ArticleSelectors,
    failing_goto: bool,
    state: Mutex<MockState>,
}

#[derive(Default)]
pub struct MockPageBuilder {
    pages: Vec<MockPageData>,
    failing_goto: bool,
}

impl MockPageBuilder {
    /// ページを追加（前のページには有効な「次へ」が付く）
    pub fn page(
        mut self,
        url: &str,
        titles: Vec<(&str, &str)>,
        descriptions: Vec<&str>,
        dates: Vec<&str>,
    ) -> Self {
        self.link_previous();
        self.pages.push(MockPageData {
            url: url.to_string(),
            titles: titles
                .into_iter()
                .map(|(text, href)| RawAnchor::new(text, Some(href)))
                .collect(),
            descriptions: descriptions.into_iter().map(str::to_string).collect(),
            dates: dates.into_iter().map(str::to_string).collect(),
            groups: None,
            next: None,
            click_advances: false,
            navigation_delay: Duration::ZERO,
            failing: false,
        });
        self
    }

    /// コンテナ単位のデータを持つページを追加
    pub fn grouped_page(mut self, url: &str, groups: Vec<RawGroup>) -> Self {
        self.link_previous();
        let titles = groups.iter().filter_map(|g| g.title.clone()).collect();
        self.pages.push(MockPageData {
            url: url.to_string(),
            titles,
            descriptions: Vec::new(),
            dates: Vec::new(),
            groups: Some(groups),
            next: None,
            click_advances: false,
            navigation_delay: Duration::ZERO,
            failing: false,
        });
        self
    }

    /// 直前に追加したページの「次へ」の状態
    pub fn next_control(mut self, state: ControlState) -> Self {
        if let Some(last) = self.pages.last_mut() {
            last.next = Some(state);
        }
        self
    }

    /// 直前に追加したページの「次へ」をクリックしても何も起きない
    pub fn click_does_nothing(mut self) -> Self {
        if let Some(last) = self.pages.last_mut() {
            last.click_advances = false;
        }
        self
    }

    /// 直前に追加したページでクリックから遷移までにかかる時間
    pub fn navigation_delay(mut self, delay: Duration) -> Self {
        if let Some(last) = self.pages.last_mut() {
            last.navigation_delay = delay;
        }
        self
    }

    /// 直前に追加したページの抽出をエラーにする
    pub fn failing(mut self) -> Self {
        if let Some(last) = self.pages.last_mut() {
            last.failing = true;
        }
        self
    }

    pub fn failing_goto(mut self) -> Self {
        self.failing_goto = true;
        self
    }

    pub fn build(self) -> MockPage {
        MockPage {
            pages: self.pages,
            selectors: ArticleSelectors::default(),
            failing_goto: self.failing_goto,
            state: Mutex::new(MockState {
                current: 0,
                pending: None,
                clicks: 0,
                first_text_calls: 0,
                visited: Vec::new(),
            }),
        }
    }

    fn link_previous(&mut self) {
        if let Some(last) = self.pages.last_mut() {
            if last.next.is_none() {
                last.next = Some(ControlState {
                    visible: true,
                    enabled: true,
                });
            }
            last.click_advances = true;
        }
    }
}

impl MockPage {
    pub fn builder() -> MockPageBuilder {
        MockPageBuilder::default()
    }

    pub fn clicks(&self) -> usize {
        self.lock().clicks
    }

    pub fn first_text_calls(&self) -> usize {
        self.lock().first_text_calls
    }

    pub fn visited(&self) -> Vec<String> {
        self.lock().visited.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    /// 保留中の遷移を反映して現在のページを返す
    fn current(&self) -> Option<&MockPageData> {
        let mut state = self.lock();
        if let Some((at, target)) = state.pending {
            if Instant::now() >= at {
                state.current = target;
                state.pending = None;
            }
        }
        self.pages.get(state.current)
    }

    fn current_or_err(&self) -> Result<&MockPageData, ScraperError> {
        self.current()
            .ok_or_else(|| ScraperError::Navigation("no page loaded".into()))
    }
}

#[async_trait]
impl PageDriver for MockPage {
    async fn goto(&self, url: &str) -> Result<(), ScraperError> {
        if self.failing_goto {
            return Err(ScraperError::Navigation(format!("net::ERR_NAME_NOT_RESOLVED at {}", url)));
        }
        let mut state = self.lock();
        state.visited.push(url.to_string());
        state.current = 0;
        state.pending = None;
        Ok(())
    }

    async fn current_url(&self) -> Result<String, ScraperError> {
        Ok(self.current_or_err()?.url.clone())
    }

    async fn count(&self, selector: &str) -> Result<usize, ScraperError> {
        let page = self.current_or_err()?;
        if selector == self.selectors.next_page {
            return Ok(usize::from(page.next.is_some()));
        }
        Ok(page.titles.len())
    }

    async fn texts(&self, selector: &str) -> Result<Vec<String>, ScraperError> {
        let page = self.current_or_err()?;
        if page.failing {
            return Err(ScraperError::JavaScript("Execution context was destroyed".into()));
        }
        if selector == self.selectors.description {
            Ok(page.descriptions.clone())
        } else if selector == self.selectors.date {
            Ok(page.dates.clone())
        } else {
            Ok(page.titles.iter().map(|t| t.text.clone()).collect())
        }
    }

    async fn anchors(&self, _selector: &str) -> Result<Vec<RawAnchor>, ScraperError> {
        let page = self.current_or_err()?;
        if page.failing {
            return Err(ScraperError::JavaScript("Execution context was destroyed".into()));
        }
        Ok(page.titles.clone())
    }

    async fn groups(
        &self,
        _container: &str,
        _selectors: &ArticleSelectors,
    ) -> Result<Vec<RawGroup>, ScraperError> {
        let page = self.current_or_err()?;
        Ok(page.groups.clone().unwrap_or_default())
    }

    async fn control_state(&self, _selector: &str) -> Result<Option<ControlState>, ScraperError> {
        Ok(self.current_or_err()?.next)
    }

    async fn click(&self, selector: &str) -> Result<(), ScraperError> {
        let page = self.current_or_err()?.clone();
        let mut state = self.lock();
        if page.next.is_none() {
            return Err(ScraperError::ElementNotFound(selector.to_string()));
        }
        state.clicks += 1;
        if page.click_advances {
            let target = state.current + 1;
            state.pending = Some((Instant::now() + page.navigation_delay, target));
        }
        Ok(())
    }

    async fn first_text(&self, _selector: &str) -> Result<Option<String>, ScraperError> {
        self.lock().first_text_calls += 1;
        let page = self.current_or_err()?;
        Ok(page.titles.first().map(|t| t.text.trim().to_string()))
    }

    async fn content_length(&self) -> Result<usize, ScraperError> {
        let page = self.current_or_err()?;
        Ok(page.url.len() + page.titles.len() * 100)
    }

    async fn screenshot(&self) -> Result<Vec<u8>, ScraperError> {
        Ok(vec![0x89, b'P', b'N', b'G'])
    }
}
