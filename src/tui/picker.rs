//! 会话选择器状态机
//!
//! 不依赖任何 UI 事件循环：输入离散事件，得到新状态和可选的最终结果。

use crate::reconcile::ReconciledSession;

/// 选择器中的一项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanItem {
    pub entry: ReconciledSession,
    pub selected: bool,
    /// 会话正在执行任务，不能被选中
    pub disabled: bool,
}

/// 选择器输入
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerInput {
    Up,
    Down,
    Toggle,
    SelectAll,
    SelectNone,
    Confirm,
    Quit,
}

/// 选择器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerState {
    Browsing,
    Submitted,
    Cancelled,
}

/// 最终结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerOutcome {
    /// 选中的会话
    Submitted(Vec<ReconciledSession>),
    /// 用户取消，不执行任何重启
    Cancelled,
}

/// 重启计划选择器
#[derive(Debug, Clone)]
pub struct Picker {
    items: Vec<PlanItem>,
    cursor: usize,
    state: PickerState,
}

impl Picker {
    /// 非禁用项默认选中；没有候选时直接处于 Submitted 状态
    pub fn new(candidates: Vec<ReconciledSession>) -> Self {
        let items: Vec<PlanItem> = candidates
            .into_iter()
            .map(|entry| {
                let disabled = entry.session.has_active_work;
                PlanItem {
                    entry,
                    selected: !disabled,
                    disabled,
                }
            })
            .collect();

        let state = if items.is_empty() {
            PickerState::Submitted
        } else {
            PickerState::Browsing
        };

        Self {
            items,
            cursor: 0,
            state,
        }
    }

    pub fn items(&self) -> &[PlanItem] {
        &self.items
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn state(&self) -> PickerState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state != PickerState::Browsing
    }

    /// 处理一个输入；进入终止状态后输入被忽略
    pub fn handle(&mut self, input: PickerInput) -> Option<PickerOutcome> {
        if self.state == PickerState::Browsing {
            match input {
                PickerInput::Up => {
                    self.cursor = self.cursor.saturating_sub(1);
                }
                PickerInput::Down => {
                    if self.cursor + 1 < self.items.len() {
                        self.cursor += 1;
                    }
                }
                PickerInput::Toggle => {
                    if let Some(item) = self.items.get_mut(self.cursor) {
                        if !item.disabled {
                            item.selected = !item.selected;
                        }
                    }
                }
                PickerInput::SelectAll => {
                    for item in self.items.iter_mut().filter(|i| !i.disabled) {
                        item.selected = true;
                    }
                }
                PickerInput::SelectNone => {
                    for item in self.items.iter_mut() {
                        item.selected = false;
                    }
                }
                PickerInput::Confirm => self.state = PickerState::Submitted,
                PickerInput::Quit => self.state = PickerState::Cancelled,
            }
        }
        self.outcome()
    }

    /// 终止状态下的结果，浏览中为 None
    pub fn outcome(&self) -> Option<PickerOutcome> {
        match self.state {
            PickerState::Browsing => None,
            PickerState::Submitted => Some(PickerOutcome::Submitted(self.selected())),
            PickerState::Cancelled => Some(PickerOutcome::Cancelled),
        }
    }

    /// 当前选中的会话
    pub fn selected(&self) -> Vec<ReconciledSession> {
        self.items
            .iter()
            .filter(|item| item.selected)
            .map(|item| item.entry.clone())
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.items.iter().filter(|item| item.selected).count()
    }
}
