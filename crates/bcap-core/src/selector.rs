//! 控制器变体选择
//!
//! 根据控制器类型码与机器人型号标识选择具体的驱动变体：
//!
//! | 类型码 | 型号                          | 变体          |
//! |--------|-------------------------------|---------------|
//! | 8      | `"cobotta"` 的非空前缀        | RC8 COBOTTA   |
//! | 8      | 其他（包括空字符串）          | RC8           |
//! | 9      | 任意                          | RC9           |
//! | 其他   | -                             | 错误          |

use crate::error::CoreError;
use bcap_driver::{
    BcapController, ControllerDriver, ControllerParams, ControllerVariant, SessionLink,
};
use tracing::error;

/// COBOTTA 型号标识
pub const COBOTTA_MODEL: &str = "cobotta";

/// 控制器类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ControllerType {
    /// RC8 系列
    Rc8 = 8,
    /// RC9 系列
    Rc9 = 9,
}

impl TryFrom<i32> for ControllerType {
    type Error = CoreError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            8 => Ok(Self::Rc8),
            9 => Ok(Self::Rc9),
            other => Err(CoreError::UnsupportedController(other)),
        }
    }
}

impl ControllerType {
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

/// 型号是否为 COBOTTA
///
/// 只比较型号本身长度的字符（区分大小写），即型号必须是 `"cobotta"` 的前缀。
/// 空型号永远不匹配。
pub fn is_cobotta_model(model: &str) -> bool {
    !model.is_empty() && COBOTTA_MODEL.starts_with(model)
}

/// 选择控制器变体（纯函数）
pub fn select_variant(controller_type: i32, model: &str) -> Result<ControllerVariant, CoreError> {
    match ControllerType::try_from(controller_type)? {
        ControllerType::Rc8 if is_cobotta_model(model) => Ok(ControllerVariant::Rc8Cobotta),
        ControllerType::Rc8 => Ok(ControllerVariant::Rc8),
        ControllerType::Rc9 => Ok(ControllerVariant::Rc9),
    }
}

/// 驱动工厂
///
/// 负责把选中的变体实例化为具体驱动。监督器只依赖这个接口，
/// 测试可以注入记录型驱动。
pub trait DriverFactory: Send + Sync {
    fn create(
        &self,
        variant: ControllerVariant,
        params: ControllerParams,
    ) -> Box<dyn ControllerDriver>;
}

/// b-CAP 驱动工厂
///
/// `make_link` 为每个新驱动创建一条会话链路。
///
/// # 示例
///
/// ```rust
/// use bcap_core::BcapFactory;
/// use bcap_driver::SimLink;
///
/// let factory = BcapFactory::new(|_params: &bcap_driver::ControllerParams| SimLink::new());
/// ```
pub struct BcapFactory<F> {
    make_link: F,
}

impl<F> BcapFactory<F> {
    pub fn new(make_link: F) -> Self {
        Self { make_link }
    }
}

impl<F, L> DriverFactory for BcapFactory<F>
where
    F: Fn(&ControllerParams) -> L + Send + Sync,
    L: SessionLink + 'static,
{
    fn create(
        &self,
        variant: ControllerVariant,
        params: ControllerParams,
    ) -> Box<dyn ControllerDriver> {
        let link = (self.make_link)(&params);
        Box::new(BcapController::new(variant, params, link))
    }
}

/// 选择并实例化驱动
///
/// 不支持的类型码直接返回错误，不会创建任何驱动。
pub fn select_driver(
    factory: &dyn DriverFactory,
    controller_type: i32,
    model: &str,
    params: ControllerParams,
) -> Result<Box<dyn ControllerDriver>, CoreError> {
    let variant = select_variant(controller_type, model).inspect_err(|_| {
        error!("Invalid argument value [controller_type]: {}", controller_type);
    })?;
    Ok(factory.create(variant, params))
}
